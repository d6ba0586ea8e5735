//! Script transform evaluation
//!
//! Compiles and runs a user-authored script body against
//! `(payload, context)` and normalizes every failure into a displayable
//! message. Nothing here can crash the host.

use std::sync::Arc;

use crate::lookup::LookupResolver;
use crate::transform::engine::PreviewError;
use crate::transform::types::ExecutionContext;

use super::runtime::ScriptRuntime;

/// Fixed message for an empty/missing script, regardless of payload
pub const NO_SCRIPT_MESSAGE: &str = "no script defined";

/// Evaluate a script body against a payload and context.
///
/// - empty/whitespace script: `MissingConfiguration` with a fixed message
/// - syntax or runtime errors (including non-string throws): `UserInput`
///   carrying a cleaned, display-ready message
/// - success: the script's return value as JSON (nil becomes null)
pub fn evaluate_script(
    script: &str,
    payload: &serde_json::Value,
    context: &ExecutionContext,
    lookups: Arc<dyn LookupResolver>,
) -> Result<serde_json::Value, PreviewError> {
    if script.trim().is_empty() {
        return Err(PreviewError::MissingConfiguration(
            NO_SCRIPT_MESSAGE.to_string(),
        ));
    }

    let runtime = ScriptRuntime::new(lookups)
        .map_err(|e| PreviewError::Internal(format!("script runtime: {e}")))?;

    let context_json = serde_json::to_value(context)
        .map_err(|e| PreviewError::Internal(format!("context serialization: {e}")))?;

    let func = runtime
        .load_body(script)
        .map_err(|e| PreviewError::UserInput(error_message(&e)))?;

    runtime
        .call(&func, payload, &context_json)
        .map_err(|e| PreviewError::UserInput(error_message(&e)))
}

/// Extract a display-ready message from a Lua error
fn error_message(err: &mlua::Error) -> String {
    match err {
        mlua::Error::RuntimeError(m) => strip_chunk_prefix(m),
        mlua::Error::SyntaxError { message, .. } => strip_chunk_prefix(message),
        // Errors raised inside lib.* callbacks arrive wrapped
        mlua::Error::CallbackError { cause, .. } => error_message(cause),
        other => other.to_string(),
    }
}

/// Strip the `[string "..."]:N:` chunk-position prefix Lua puts on error
/// messages, and drop any traceback lines.
fn strip_chunk_prefix(message: &str) -> String {
    let first = message.lines().next().unwrap_or(message);

    let mut rest = first;
    if rest.starts_with("[string ") {
        if let Some(idx) = rest.find("]:") {
            rest = &rest[idx + 2..];
            // skip the line number that follows the chunk name
            if let Some(colon) = rest.find(": ") {
                let (line_no, tail) = rest.split_at(colon);
                if !line_no.is_empty() && line_no.chars().all(|c| c.is_ascii_digit()) {
                    rest = &tail[2..];
                }
            }
        }
    }

    rest.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{InMemoryLookupResolver, NoLookups};
    use serde_json::json;

    fn run(script: &str, payload: serde_json::Value) -> Result<serde_json::Value, PreviewError> {
        evaluate_script(
            script,
            &payload,
            &ExecutionContext::new("patient.admitted", "t-1", "patient"),
            Arc::new(NoLookups),
        )
    }

    #[test]
    fn test_script_returning_value() {
        let result = run("return payload.x + 1", json!({"x": 41})).unwrap();
        assert_eq!(result, json!(42));
    }

    #[test]
    fn test_script_building_object() {
        let result = run(
            r#"return { fullName = lib.upper(payload.patient.name) }"#,
            json!({"patient": {"name": "Jo"}}),
        )
        .unwrap();
        assert_eq!(result, json!({"fullName": "JO"}));
    }

    #[test]
    fn test_empty_script_is_missing_configuration() {
        for script in ["", "   ", "\n\t"] {
            match run(script, json!({"x": 1})) {
                Err(PreviewError::MissingConfiguration(m)) => assert_eq!(m, NO_SCRIPT_MESSAGE),
                other => panic!("expected MissingConfiguration, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_runtime_error_message_is_clean() {
        match run("error('bad')", json!({})) {
            Err(PreviewError::UserInput(m)) => assert_eq!(m, "bad"),
            other => panic!("expected UserInput, got {:?}", other),
        }
    }

    #[test]
    fn test_error_from_nil_indexing() {
        match run("return payload.a.b", json!({})) {
            Err(PreviewError::UserInput(m)) => {
                assert!(m.contains("nil"), "message was: {}", m);
                assert!(!m.contains("[string"), "message was: {}", m);
            }
            other => panic!("expected UserInput, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_is_user_input() {
        assert!(matches!(
            run("return return", json!({})),
            Err(PreviewError::UserInput(_))
        ));
    }

    #[test]
    fn test_non_string_throw_is_captured() {
        let result = run("error({ code = 1 })", json!({}));
        assert!(matches!(result, Err(PreviewError::UserInput(_))));
    }

    #[test]
    fn test_cyclic_table_result_reports_error() {
        match run("local t = {}\nt.x = t\nreturn t", json!({})) {
            Err(PreviewError::UserInput(m)) => {
                assert!(m.contains("nesting"), "message was: {}", m);
            }
            other => panic!("expected UserInput, got {:?}", other),
        }
    }

    #[test]
    fn test_script_can_use_lookup() {
        let resolver = InMemoryLookupResolver::new()
            .with_table("gender", [("M".to_string(), "male".to_string())]);
        let result = evaluate_script(
            r#"return { gender = lib.lookup(payload.gender, "gender") }"#,
            &json!({"gender": "M"}),
            &ExecutionContext::default(),
            Arc::new(resolver),
        )
        .unwrap();
        assert_eq!(result, json!({"gender": "male"}));
    }

    #[test]
    fn test_script_returning_nothing_is_null() {
        let result = run("local x = 1", json!({})).unwrap();
        assert_eq!(result, json!(null));
    }

    #[test]
    fn test_strip_chunk_prefix() {
        assert_eq!(
            strip_chunk_prefix(r#"[string "return function(payload, context)..."]:2: bad"#),
            "bad"
        );
        assert_eq!(strip_chunk_prefix("plain message"), "plain message");
        assert_eq!(
            strip_chunk_prefix("first line\nstack traceback:\n  ..."),
            "first line"
        );
    }
}
