//! Preview coordination: debounce, ordering, teardown
//!
//! Owns the discipline shared by every "edit script, see live result"
//! surface: each input change schedules an evaluation after a quiet period,
//! and only the most recently issued run may ever update the visible
//! outcome (last-issue-wins, even under adversarial completion ordering).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::outcome::PreviewOutcome;
use super::PreviewEvaluator;

/// Quiet period after the last edit before an evaluation is issued
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

/// Defensive bound on a single evaluation; converts to an Error outcome
pub const DEFAULT_EVAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Coordinates debounced preview evaluation for one surface.
///
/// Requires a tokio runtime. Each `input_changed` resets the debounce
/// timer and bumps a generation counter; the counter captured when a run
/// is dispatched is compared again before its result is committed, so a
/// superseded run's result is silently discarded no matter when it
/// resolves.
pub struct PreviewCoordinator<E: PreviewEvaluator> {
    evaluator: Arc<E>,
    debounce: Duration,
    eval_timeout: Duration,
    generation: Arc<AtomicU64>,
    outcome_tx: watch::Sender<PreviewOutcome>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<E: PreviewEvaluator> PreviewCoordinator<E> {
    pub fn new(evaluator: E) -> Self {
        PreviewCoordinator {
            evaluator: Arc::new(evaluator),
            debounce: DEFAULT_DEBOUNCE,
            eval_timeout: DEFAULT_EVAL_TIMEOUT,
            generation: Arc::new(AtomicU64::new(0)),
            outcome_tx: watch::Sender::new(PreviewOutcome::Idle),
            pending: Mutex::new(None),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_eval_timeout(mut self, timeout: Duration) -> Self {
        self.eval_timeout = timeout;
        self
    }

    /// Watch the view model; the receiver sees every committed transition
    pub fn subscribe(&self) -> watch::Receiver<PreviewOutcome> {
        self.outcome_tx.subscribe()
    }

    /// Current view model state
    pub fn outcome(&self) -> PreviewOutcome {
        self.outcome_tx.borrow().clone()
    }

    /// Record an input change (script text, rule set, sample payload).
    ///
    /// Resets the quiet-period timer; after it elapses undisturbed, one
    /// evaluation is issued for the given input. Whitespace-only edits are
    /// not special-cased. The previously visible Success/Error stays on
    /// screen until the new run reaches Loading.
    pub fn input_changed(&self, input: E::Input) {
        // Invalidate any pending timer and any in-flight run
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_pending();

        let evaluator = self.evaluator.clone();
        let counter = self.generation.clone();
        let outcome_tx = self.outcome_tx.clone();
        let debounce = self.debounce;
        let eval_timeout = self.eval_timeout;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            // Superseded while waiting (abort usually got here first)
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }

            outcome_tx.send_replace(PreviewOutcome::Loading);

            let result = tokio::time::timeout(eval_timeout, evaluator.evaluate(input)).await;

            // Liveness check at commit time: a newer edit wins even if this
            // run resolved first
            if counter.load(Ordering::SeqCst) != generation {
                log::debug!("discarding superseded preview result (gen {})", generation);
                return;
            }

            let outcome = match result {
                Ok(run) => PreviewOutcome::from_result(run),
                Err(_) => PreviewOutcome::Error {
                    message: format!(
                        "preview timed out after {}s",
                        eval_timeout.as_secs()
                    ),
                },
            };
            outcome_tx.send_replace(outcome);
        });

        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(handle);
        }
    }

    /// Tear down the surface: cancel the pending timer, mark any in-flight
    /// run dead, and return to Idle (not Error).
    pub fn close(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_pending();
        self.outcome_tx.send_replace(PreviewOutcome::Idle);
    }

    fn abort_pending(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

impl<E: PreviewEvaluator> Drop for PreviewCoordinator<E> {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
