//! Preview view model
//!
//! The three-state (plus idle) outcome every preview surface renders from.
//! One value exists per surface; it is only ever replaced by the outcome of
//! the most recently issued run.

use serde::{Deserialize, Serialize};

use crate::transform::{PreviewError, PreviewReport};

/// Outcome of the current preview run, as the UI sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PreviewOutcome {
    Idle,
    Loading,
    Success {
        output: serde_json::Value,
        #[serde(default, rename = "durationMs", skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    Error {
        message: String,
    },
}

impl PreviewOutcome {
    pub fn is_loading(&self) -> bool {
        matches!(self, PreviewOutcome::Loading)
    }

    pub fn from_result(result: Result<PreviewReport, PreviewError>) -> Self {
        match result {
            Ok(report) => PreviewOutcome::Success {
                output: report.output,
                duration_ms: report.duration_ms,
            },
            Err(e) => PreviewOutcome::Error {
                message: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_tag() {
        let outcome = PreviewOutcome::Success {
            output: json!({"a": 1}),
            duration_ms: Some(12),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["durationMs"], 12);

        let value = serde_json::to_value(PreviewOutcome::Idle).unwrap();
        assert_eq!(value, json!({"status": "idle"}));
    }

    #[test]
    fn test_from_result() {
        let outcome = PreviewOutcome::from_result(Err(PreviewError::UserInput("bad".into())));
        assert_eq!(
            outcome,
            PreviewOutcome::Error {
                message: "bad".to_string()
            }
        );

        let outcome = PreviewOutcome::from_result(Ok(PreviewReport {
            output: json!(42),
            duration_ms: None,
        }));
        assert_eq!(
            outcome,
            PreviewOutcome::Success {
                output: json!(42),
                duration_ms: None
            }
        );
    }
}
