//! Transformation engine - dispatches between mapping and script evaluation
//!
//! Callers hand in a `TransformationConfig` and get back a single normalized
//! outcome regardless of mode, so no caller ever branches on SIMPLE vs
//! SCRIPT.

use std::sync::Arc;
use std::time::Instant;

use crate::lookup::LookupResolver;
use crate::script::evaluate_script;

use super::mapping;
use super::types::{ExecutionContext, TransformationConfig};

/// Error taxonomy for a preview run.
///
/// Every variant is recoverable at the boundary of a single run and its
/// message is safe to render next to the editor. `Display` is the message
/// itself; the variant carries the classification.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewError {
    /// Malformed sample JSON, invalid script syntax, or a script that threw
    UserInput(String),
    /// No script defined, or no event type/sample selected
    MissingConfiguration(String),
    /// Network/service failure from the scheduling-preview service
    Remote(String),
    /// Host-side failure (runtime construction, panicked task)
    Internal(String),
}

impl std::fmt::Display for PreviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreviewError::UserInput(m)
            | PreviewError::MissingConfiguration(m)
            | PreviewError::Remote(m) => write!(f, "{}", m),
            PreviewError::Internal(m) => write!(f, "internal error: {}", m),
        }
    }
}

impl std::error::Error for PreviewError {}

/// Successful preview run: a JSON-serializable output plus timing
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewReport {
    pub output: serde_json::Value,
    pub duration_ms: Option<u64>,
}

/// Engine selecting the evaluator for a transformation config
pub struct TransformationEngine {
    lookups: Arc<dyn LookupResolver>,
}

impl TransformationEngine {
    pub fn new(lookups: Arc<dyn LookupResolver>) -> Self {
        TransformationEngine { lookups }
    }

    /// Run a transformation config against a sample payload.
    ///
    /// Dispatch is purely on the config variant: `Simple` evaluates the
    /// declarative mappings (and cannot fail), `Script` compiles and runs
    /// the script body. Execution is synchronous.
    pub fn run(
        &self,
        config: &TransformationConfig,
        payload: &serde_json::Value,
        context: &ExecutionContext,
    ) -> Result<PreviewReport, PreviewError> {
        let started = Instant::now();

        let output = match config {
            TransformationConfig::Simple {
                mappings,
                static_fields,
            } => mapping::evaluate(mappings, static_fields, payload, self.lookups.as_ref()),
            TransformationConfig::Script { script } => {
                evaluate_script(script, payload, context, self.lookups.clone())?
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        log::debug!("preview run completed in {}ms", duration_ms);

        Ok(PreviewReport {
            output,
            duration_ms: Some(duration_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::NoLookups;
    use crate::transform::types::{FieldTransform, StaticField, TransformRule};
    use serde_json::json;

    fn engine() -> TransformationEngine {
        TransformationEngine::new(Arc::new(NoLookups))
    }

    #[test]
    fn test_simple_mode_dispatch() {
        let config = TransformationConfig::Simple {
            mappings: vec![
                TransformRule::new("fullName", "patient.name")
                    .with_transform(FieldTransform::Upper),
            ],
            static_fields: vec![StaticField::new("source", "relay")],
        };

        let report = engine()
            .run(
                &config,
                &json!({"patient": {"name": "Jo"}}),
                &ExecutionContext::default(),
            )
            .unwrap();

        assert_eq!(report.output, json!({"fullName": "JO", "source": "relay"}));
        assert!(report.duration_ms.is_some());
    }

    #[test]
    fn test_script_mode_dispatch() {
        let config = TransformationConfig::script("return payload.x + 1");

        let report = engine()
            .run(&config, &json!({"x": 41}), &ExecutionContext::default())
            .unwrap();
        assert_eq!(report.output, json!(42));
    }

    #[test]
    fn test_script_error_normalized() {
        let config = TransformationConfig::script("error('bad')");

        let err = engine()
            .run(&config, &json!({}), &ExecutionContext::default())
            .unwrap_err();
        assert_eq!(err, PreviewError::UserInput("bad".to_string()));
        assert_eq!(err.to_string(), "bad");
    }

    #[test]
    fn test_simple_mode_never_fails() {
        let config = TransformationConfig::Simple {
            mappings: vec![TransformRule::new("a", "totally.missing.path")],
            static_fields: vec![],
        };

        let report = engine()
            .run(&config, &json!("not even an object"), &ExecutionContext::default())
            .unwrap();
        assert_eq!(report.output, json!({}));
    }

    #[test]
    fn test_empty_script_distinct_from_execution_failure() {
        let config = TransformationConfig::script("");
        let err = engine()
            .run(&config, &json!({}), &ExecutionContext::default())
            .unwrap_err();
        assert!(matches!(err, PreviewError::MissingConfiguration(_)));
    }

    #[test]
    fn test_output_is_json_serializable() {
        let config = TransformationConfig::script(
            r#"return { list = {1, 2, 3}, nested = { ok = true } }"#,
        );
        let report = engine()
            .run(&config, &json!({}), &ExecutionContext::default())
            .unwrap();
        let rendered = serde_json::to_string_pretty(&report.output).unwrap();
        assert!(rendered.contains("nested"));
    }
}
