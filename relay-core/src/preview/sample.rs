//! Sample payload selection for preview runs
//!
//! Precedence, highest first: operator-supplied custom payload, then the
//! event catalog's example for the selected event type, then nothing (the
//! surface shows guidance instead of evaluating).

use std::collections::HashMap;

use crate::transform::PreviewError;

/// Guidance shown when no sample is available
pub const SELECT_SAMPLE_GUIDANCE: &str = "select an event type or supply custom sample data";

/// Supplies an example payload per event type
pub trait EventCatalog: Send + Sync {
    fn sample_payload(&self, event_type: &str) -> Option<serde_json::Value>;
}

/// In-memory event catalog
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventCatalog {
    samples: HashMap<String, serde_json::Value>,
}

impl InMemoryEventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample(
        mut self,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        self.samples.insert(event_type.into(), payload);
        self
    }
}

impl EventCatalog for InMemoryEventCatalog {
    fn sample_payload(&self, event_type: &str) -> Option<serde_json::Value> {
        self.samples.get(event_type).cloned()
    }
}

/// The sample chosen for a preview run, with its provenance
#[derive(Debug, Clone, PartialEq)]
pub enum SamplePayload {
    /// Operator-authored custom JSON
    Custom(serde_json::Value),
    /// Event-type example from the catalog
    Example {
        event_type: String,
        payload: serde_json::Value,
    },
}

impl SamplePayload {
    pub fn payload(&self) -> &serde_json::Value {
        match self {
            SamplePayload::Custom(payload) => payload,
            SamplePayload::Example { payload, .. } => payload,
        }
    }
}

/// Per-surface sample selection state
#[derive(Debug, Clone, Default)]
pub struct SamplePayloadResolver {
    custom: Option<serde_json::Value>,
}

impl SamplePayloadResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply a custom payload directly
    pub fn set_custom(&mut self, payload: serde_json::Value) {
        self.custom = Some(payload);
    }

    /// Parse and store operator-typed JSON; malformed text is a recoverable
    /// input error, not a panic
    pub fn set_custom_json(&mut self, text: &str) -> Result<(), PreviewError> {
        let payload: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| PreviewError::UserInput(format!("invalid sample JSON: {e}")))?;
        self.custom = Some(payload);
        Ok(())
    }

    /// Discard the custom payload, falling back to the catalog
    pub fn reset(&mut self) {
        self.custom = None;
    }

    pub fn has_custom(&self) -> bool {
        self.custom.is_some()
    }

    /// Choose the sample for a preview run
    pub fn resolve(
        &self,
        selected_event_type: Option<&str>,
        catalog: &dyn EventCatalog,
    ) -> Option<SamplePayload> {
        if let Some(custom) = &self.custom {
            return Some(SamplePayload::Custom(custom.clone()));
        }

        let event_type = selected_event_type?;
        catalog
            .sample_payload(event_type)
            .map(|payload| SamplePayload::Example {
                event_type: event_type.to_string(),
                payload,
            })
    }

    /// Like `resolve`, but a missing sample becomes configuration guidance
    pub fn resolve_required(
        &self,
        selected_event_type: Option<&str>,
        catalog: &dyn EventCatalog,
    ) -> Result<SamplePayload, PreviewError> {
        self.resolve(selected_event_type, catalog)
            .ok_or_else(|| PreviewError::MissingConfiguration(SELECT_SAMPLE_GUIDANCE.to_string()))
    }
}
