//! Payload transformation and script preview for event delivery rules
//!
//! An inbound event is mapped into an outbound payload using either a
//! declarative field-mapping description or a user-authored script, and
//! operators can preview the result of their edits against sample data
//! without blocking the host or racing stale results.
//!
//! The moving parts:
//! - [`transform`]: the mapping/script dispatch producing one normalized
//!   outcome per run
//! - [`script`]: the sandboxed Lua environment and its `lib.*` utilities
//! - [`preview`]: the debounce/ordering coordinator, view model, and
//!   sample payload selection
//! - [`schedule`]: delivery modes, script templates, and the remote
//!   scheduling-preview client
//! - [`lookup`]: the read-only lookup-table collaborator seam

pub mod lookup;
pub mod preview;
pub mod schedule;
pub mod script;
pub mod transform;

pub use lookup::{InMemoryLookupResolver, LookupResolver, NoLookups};
pub use preview::{
    EventCatalog, InMemoryEventCatalog, PreviewCoordinator, PreviewEvaluator, PreviewOutcome,
    SamplePayload, SamplePayloadResolver, TransformPreviewEvaluator, TransformPreviewRequest,
};
pub use schedule::{DeliveryMode, RecurrenceInterval, SchedulePreviewClient};
pub use transform::{
    duplicate_targets, ExecutionContext, FieldTransform, PreviewError, PreviewReport,
    StaticField, TransformRule, TransformationConfig, TransformationEngine,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    /// Wait (real time) for the next Success/Error the surface commits
    async fn settled_outcome(
        rx: &mut tokio::sync::watch::Receiver<PreviewOutcome>,
    ) -> PreviewOutcome {
        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                rx.changed().await.unwrap();
                let outcome = rx.borrow().clone();
                if !matches!(outcome, PreviewOutcome::Loading) {
                    return outcome;
                }
            }
        })
        .await
        .unwrap()
    }

    /// Full data flow: edit -> debounce -> engine against the resolved
    /// sample -> outcome in the view model.
    #[tokio::test]
    async fn test_edit_to_preview_flow() {
        let _ = env_logger::builder().is_test(true).try_init();

        let catalog = InMemoryEventCatalog::new()
            .with_sample("patient.admitted", json!({"patient": {"name": "Jo"}}));
        let resolver = SamplePayloadResolver::new();
        let sample = resolver
            .resolve_required(Some("patient.admitted"), &catalog)
            .unwrap();

        let lookups: Arc<dyn LookupResolver> = Arc::new(NoLookups);
        let coordinator = PreviewCoordinator::new(TransformPreviewEvaluator::new(
            TransformationEngine::new(lookups),
        ))
        .with_debounce(Duration::from_millis(10));
        let mut rx = coordinator.subscribe();

        coordinator.input_changed(TransformPreviewRequest {
            config: TransformationConfig::Simple {
                mappings: vec![TransformRule::new("fullName", "patient.name")
                    .with_transform(FieldTransform::Upper)],
                static_fields: vec![StaticField::new("source", "relay")],
            },
            payload: sample.payload().clone(),
            context: ExecutionContext::new("patient.admitted", "t-1", "patient"),
        });

        match settled_outcome(&mut rx).await {
            PreviewOutcome::Success { output, .. } => {
                assert_eq!(output, json!({"fullName": "JO", "source": "relay"}));
            }
            other => panic!("expected Success, got {:?}", other),
        }
    }

    /// Applying a template then previewing it as a script edit
    #[tokio::test]
    async fn test_template_script_previews_as_error_free_edit() {
        let script = schedule::templates::DelayedQuickBuilder {
            offset_hours: 2,
            ..Default::default()
        }
        .build();
        assert!(!schedule::has_drifted(&script, &script));

        let coordinator = PreviewCoordinator::new(TransformPreviewEvaluator::new(
            TransformationEngine::new(Arc::new(NoLookups)),
        ))
        .with_debounce(Duration::from_millis(10));
        let mut rx = coordinator.subscribe();

        coordinator.input_changed(TransformPreviewRequest {
            config: TransformationConfig::script(script),
            payload: json!({}),
            context: ExecutionContext::default(),
        });

        match settled_outcome(&mut rx).await {
            PreviewOutcome::Success { output, .. } => {
                assert!(output["deliver_at"].is_string());
            }
            other => panic!("expected Success, got {:?}", other),
        }
    }
}
