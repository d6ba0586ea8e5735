//! Payload transformation
//!
//! Converts an inbound event payload into an outbound payload using either
//! declarative field mappings or a user-authored script, normalized to a
//! single outcome shape.

pub mod engine;
pub mod mapping;
pub mod path;
pub mod types;

pub use engine::{PreviewError, PreviewReport, TransformationEngine};
pub use types::{
    duplicate_targets, ExecutionContext, FieldTransform, StaticField, TransformRule,
    TransformationConfig,
};
