//! Declarative field mapping evaluation
//!
//! Applies an ordered list of mapping rules plus static fields to a sample
//! payload. Evaluation is total: a missing source path or a lookup miss
//! leaves the target key absent, and nothing here can fail.

use serde_json::{Map, Value};

use crate::lookup::LookupResolver;

use super::path::resolve_path;
use super::types::{FieldTransform, StaticField, TransformRule};

/// Evaluate mapping rules and static fields against an inbound payload.
///
/// Rules are applied in declared order (duplicate target fields: last write
/// wins), then static fields in declared order, overwriting any same-named
/// mapped field. Always returns an object.
pub fn evaluate(
    rules: &[TransformRule],
    statics: &[StaticField],
    payload: &Value,
    lookups: &dyn LookupResolver,
) -> Value {
    let mut output = Map::new();

    for rule in rules {
        if let Some(value) = apply_rule(rule, payload, lookups) {
            output.insert(rule.target_field.clone(), value);
        }
    }

    for field in statics {
        output.insert(field.key.clone(), Value::String(field.value.clone()));
    }

    Value::Object(output)
}

/// Apply a single rule; `None` means the target key stays absent
fn apply_rule(rule: &TransformRule, payload: &Value, lookups: &dyn LookupResolver) -> Option<Value> {
    let source = resolve_path(payload, &rule.source_field)?;

    match &rule.transform {
        FieldTransform::None => Some(source.clone()),
        FieldTransform::Trim => Some(map_string(source, |s| s.trim().to_string())),
        FieldTransform::Upper => Some(map_string(source, |s| s.to_uppercase())),
        FieldTransform::Lower => Some(map_string(source, |s| s.to_lowercase())),
        FieldTransform::Lookup { lookup_type } => {
            let code = scalar_code(source)?;
            match lookups.resolve(&code, lookup_type) {
                Some(resolved) => Some(Value::String(resolved)),
                None => {
                    log::debug!(
                        "lookup miss: code '{}' not in table '{}' (field '{}')",
                        code,
                        lookup_type,
                        rule.target_field
                    );
                    None
                }
            }
        }
    }
}

/// String transforms pass non-string values through unchanged
fn map_string(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

/// Coerce a scalar source value into a lookup code
fn scalar_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
