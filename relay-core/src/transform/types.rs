//! Transformation configuration types
//!
//! A delivery rule's outbound payload is produced either from a declarative
//! list of field mappings or from a user-authored script. The two modes are
//! modeled as explicit variants so only the active half can ever be
//! evaluated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How the outbound payload is produced from the inbound event.
///
/// `Simple` applies declarative field mappings plus static fields;
/// `Script` runs a user-authored function body against
/// `(payload, context)`. An editor may keep the inactive half around while
/// the operator toggles modes, but that state lives in the host, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationConfig {
    Simple {
        #[serde(default)]
        mappings: Vec<TransformRule>,
        #[serde(default, rename = "staticFields")]
        static_fields: Vec<StaticField>,
    },
    Script {
        #[serde(default)]
        script: String,
    },
}

impl TransformationConfig {
    /// Empty mapping configuration
    pub fn simple() -> Self {
        TransformationConfig::Simple {
            mappings: Vec::new(),
            static_fields: Vec::new(),
        }
    }

    /// Script configuration from source text
    pub fn script(script: impl Into<String>) -> Self {
        TransformationConfig::Script {
            script: script.into(),
        }
    }
}

/// A single declarative mapping: target field <- source path + transform.
///
/// On the wire `transform` is a plain lowercase string and the lookup
/// table name rides as a sibling `lookupType` field, so a rule reads
/// `{"targetField": "sex", "sourceField": "gender", "transform": "lookup",
/// "lookupType": "gender"}`. Internally the transform and its table name
/// collapse into one [`FieldTransform`] value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransformRuleWire", into = "TransformRuleWire")]
pub struct TransformRule {
    /// Output field name
    pub target_field: String,
    /// Dot-separated path into the inbound payload (e.g., "patient.name")
    pub source_field: String,
    /// Transform applied to the resolved value
    pub transform: FieldTransform,
}

impl TransformRule {
    pub fn new(target_field: impl Into<String>, source_field: impl Into<String>) -> Self {
        TransformRule {
            target_field: target_field.into(),
            source_field: source_field.into(),
            transform: FieldTransform::None,
        }
    }

    pub fn with_transform(mut self, transform: FieldTransform) -> Self {
        self.transform = transform;
        self
    }
}

/// Flat serialized form of a rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransformRuleWire {
    target_field: String,
    source_field: String,
    #[serde(default)]
    transform: TransformKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lookup_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TransformKind {
    #[default]
    None,
    Trim,
    Upper,
    Lower,
    Lookup,
}

impl TryFrom<TransformRuleWire> for TransformRule {
    type Error = String;

    fn try_from(wire: TransformRuleWire) -> Result<Self, String> {
        let transform = match wire.transform {
            TransformKind::None => FieldTransform::None,
            TransformKind::Trim => FieldTransform::Trim,
            TransformKind::Upper => FieldTransform::Upper,
            TransformKind::Lower => FieldTransform::Lower,
            TransformKind::Lookup => FieldTransform::Lookup {
                lookup_type: wire.lookup_type.ok_or_else(|| {
                    format!(
                        "rule '{}': lookup transform requires lookupType",
                        wire.target_field
                    )
                })?,
            },
        };

        Ok(TransformRule {
            target_field: wire.target_field,
            source_field: wire.source_field,
            transform,
        })
    }
}

impl From<TransformRule> for TransformRuleWire {
    fn from(rule: TransformRule) -> Self {
        let (transform, lookup_type) = match rule.transform {
            FieldTransform::None => (TransformKind::None, None),
            FieldTransform::Trim => (TransformKind::Trim, None),
            FieldTransform::Upper => (TransformKind::Upper, None),
            FieldTransform::Lower => (TransformKind::Lower, None),
            FieldTransform::Lookup { lookup_type } => (TransformKind::Lookup, Some(lookup_type)),
        };

        TransformRuleWire {
            target_field: rule.target_field,
            source_field: rule.source_field,
            transform,
            lookup_type,
        }
    }
}

/// Transform applied to a mapped value
///
/// The string transforms are no-ops on non-string values; `Lookup` resolves
/// the value through an externally managed lookup table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldTransform {
    #[default]
    None,
    Trim,
    Upper,
    Lower,
    Lookup {
        lookup_type: String,
    },
}

impl FieldTransform {
    /// Get a human-readable description of this transform
    pub fn describe(&self) -> String {
        match self {
            FieldTransform::None => "copy".to_string(),
            FieldTransform::Trim => "trim".to_string(),
            FieldTransform::Upper => "upper".to_string(),
            FieldTransform::Lower => "lower".to_string(),
            FieldTransform::Lookup { lookup_type } => format!("lookup({})", lookup_type),
        }
    }
}

/// A constant injected into the output regardless of input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticField {
    pub key: String,
    pub value: String,
}

impl StaticField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        StaticField {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Read-only bag passed to scripts alongside the payload.
///
/// Immutable per preview run; scripts receive it as a plain table and
/// mutations never flow back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub entity_name: String,
    /// Host-specific extras, flattened into the context object
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ExecutionContext {
    pub fn new(
        event_type: impl Into<String>,
        tenant_id: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        ExecutionContext {
            event_type: event_type.into(),
            tenant_id: tenant_id.into(),
            entity_name: entity_name.into(),
            extra: HashMap::new(),
        }
    }
}

/// Find duplicated target fields in a rule list.
///
/// Evaluation keeps last-wins semantics for duplicates; this gives the
/// editing layer a validation hook so operators can fix them instead of
/// silently losing a rule. Returns each duplicated name once, in first-seen
/// order.
pub fn duplicate_targets(rules: &[TransformRule]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();

    for rule in rules {
        if !seen.insert(rule.target_field.as_str()) && !duplicates.contains(&rule.target_field) {
            duplicates.push(rule.target_field.clone());
        }
    }

    duplicates
}
