//! Live preview of transformation and scheduling edits
//!
//! Everything an "edit script, see result" surface needs: the evaluator
//! seam, the debounce/ordering coordinator, the view-model outcome, and
//! sample payload selection.

pub mod coordinator;
pub mod outcome;
pub mod sample;

use async_trait::async_trait;
use std::sync::Arc;

use crate::transform::{
    ExecutionContext, PreviewError, PreviewReport, TransformationConfig, TransformationEngine,
};

pub use coordinator::{PreviewCoordinator, DEFAULT_DEBOUNCE, DEFAULT_EVAL_TIMEOUT};
pub use outcome::PreviewOutcome;
pub use sample::{
    EventCatalog, InMemoryEventCatalog, SamplePayload, SamplePayloadResolver,
    SELECT_SAMPLE_GUIDANCE,
};

/// One evaluation issued by the coordinator.
///
/// Implementations are stateless, idempotent query services: every run is a
/// pure function of its captured input. The local transform engine and the
/// remote scheduling-preview client both sit behind this seam.
#[async_trait]
pub trait PreviewEvaluator: Send + Sync + 'static {
    type Input: Clone + Send + Sync + 'static;

    async fn evaluate(&self, input: Self::Input) -> Result<PreviewReport, PreviewError>;
}

/// Captured inputs for one local transform preview run
#[derive(Debug, Clone)]
pub struct TransformPreviewRequest {
    pub config: TransformationConfig,
    pub payload: serde_json::Value,
    pub context: ExecutionContext,
}

/// Local evaluator running the transformation engine.
///
/// Script/mapping evaluation is synchronous, so it runs on the blocking
/// pool rather than stalling the event loop.
pub struct TransformPreviewEvaluator {
    engine: Arc<TransformationEngine>,
}

impl TransformPreviewEvaluator {
    pub fn new(engine: TransformationEngine) -> Self {
        TransformPreviewEvaluator {
            engine: Arc::new(engine),
        }
    }
}

#[async_trait]
impl PreviewEvaluator for TransformPreviewEvaluator {
    type Input = TransformPreviewRequest;

    async fn evaluate(
        &self,
        input: TransformPreviewRequest,
    ) -> Result<PreviewReport, PreviewError> {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            engine.run(&input.config, &input.payload, &input.context)
        })
        .await
        .map_err(|e| PreviewError::Internal(format!("preview task failed: {e}")))?
    }
}
