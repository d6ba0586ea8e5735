//! Remote scheduling-preview service client
//!
//! Scheduling semantics (computing actual delivery timestamps) live in a
//! remote service; this client only carries the preview contract. Failures
//! surface with the raw service message and are never retried
//! automatically.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::preview::PreviewEvaluator;
use crate::transform::{PreviewError, PreviewReport};

use super::DeliveryMode;

/// Request body for a scheduling preview run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTestRequest {
    pub script: String,
    pub delivery_mode: DeliveryMode,
    pub event_type: String,
    pub payload: serde_json::Value,
}

/// Response body from the scheduling preview service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTestResponse {
    pub result: serde_json::Value,
    #[serde(default)]
    pub execution_time_ms: Option<u64>,
}

/// HTTP client for the scheduling preview endpoint
pub struct SchedulePreviewClient {
    http: reqwest::Client,
    base_url: String,
}

impl SchedulePreviewClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        SchedulePreviewClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Use a preconfigured client (timeouts, proxies, auth headers)
    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        SchedulePreviewClient {
            http,
            base_url: base_url.into(),
        }
    }

    fn test_url(&self) -> String {
        format!(
            "{}/api/delivery-rules/schedule/test",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Run one scheduling preview against the remote service
    pub async fn test(
        &self,
        request: &ScheduleTestRequest,
    ) -> Result<ScheduleTestResponse, PreviewError> {
        let response = self
            .http
            .post(self.test_url())
            .json(request)
            .send()
            .await
            .map_err(|e| PreviewError::Remote(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("scheduling preview failed with {}: {}", status, body);
            let message = if body.trim().is_empty() {
                format!("scheduling preview service returned {}", status)
            } else {
                body
            };
            return Err(PreviewError::Remote(message));
        }

        response
            .json::<ScheduleTestResponse>()
            .await
            .map_err(|e| PreviewError::Remote(format!("invalid service response: {e}")))
    }
}

#[async_trait]
impl PreviewEvaluator for SchedulePreviewClient {
    type Input = ScheduleTestRequest;

    async fn evaluate(&self, input: ScheduleTestRequest) -> Result<PreviewReport, PreviewError> {
        let response = self.test(&input).await?;
        Ok(PreviewReport {
            output: response.result,
            duration_ms: response.execution_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = ScheduleTestRequest {
            script: "return { deliver_at = lib.now() }".to_string(),
            delivery_mode: DeliveryMode::Delayed,
            event_type: "patient.admitted".to_string(),
            payload: json!({"patient": {"name": "Jo"}}),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["deliveryMode"], "DELAYED");
        assert_eq!(value["eventType"], "patient.admitted");
        assert!(value["script"].is_string());
    }

    #[test]
    fn test_response_wire_shape() {
        let response: ScheduleTestResponse = serde_json::from_value(json!({
            "result": { "deliverAt": "2026-08-28T09:00:00+00:00" },
            "executionTimeMs": 17
        }))
        .unwrap();

        assert_eq!(response.execution_time_ms, Some(17));
        assert_eq!(response.result["deliverAt"], "2026-08-28T09:00:00+00:00");
    }

    #[test]
    fn test_response_timing_optional() {
        let response: ScheduleTestResponse = serde_json::from_value(json!({
            "result": {}
        }))
        .unwrap();
        assert_eq!(response.execution_time_ms, None);
    }

    #[test]
    fn test_url_building() {
        let client = SchedulePreviewClient::new("https://api.example.com/");
        assert_eq!(
            client.test_url(),
            "https://api.example.com/api/delivery-rules/schedule/test"
        );
    }
}
