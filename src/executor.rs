//! Batch coordinator: dispatches one task per item through the admission
//! gate, records an indexed outcome for every input, and joins all tasks
//! before returning.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::aggregate;
use crate::gate::{AdmissionGate, GateSlot};
use crate::types::{BatchConfig, BatchOutcome, TaskError, DEFAULT_CONCURRENCY};
use crate::work::Work;

/// Callback invoked as items finish: `(finished_so_far, total)`.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Per-slot state during a run. Each spawned task owns its outcome
/// exclusively and hands it back through its join handle, so no two tasks
/// ever touch the same slot.
enum Slot<R, E> {
    Ready(BatchOutcome<R, E>),
    Running(JoinHandle<BatchOutcome<R, E>>),
}

/// Bounded-concurrency, order-preserving batch executor.
///
/// Runs N independent items with at most `concurrency` work invocations in
/// flight, and returns one outcome per input at the input's original
/// position. [`run`](BatchExecutor::run) itself never fails: partial failure
/// lives entirely inside the individual outcomes.
///
/// With `stop_on_error` enabled, the first work failure raises a shared stop
/// flag that halts admission of further items; work already underway is
/// never interrupted and keeps its real outcome.
pub struct BatchExecutor {
    config: BatchConfig,
    progress: Option<ProgressFn>,
}

impl BatchExecutor {
    /// Executor with default settings (concurrency 5, run everything).
    pub fn new() -> Self {
        Self {
            config: BatchConfig::default(),
            progress: None,
        }
    }

    /// Executor from an explicit config; out-of-range values are normalized.
    pub fn with_config(config: BatchConfig) -> Self {
        Self {
            config: config.normalized(),
            progress: None,
        }
    }

    /// Set the concurrency ceiling. Zero falls back to the default.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.config.concurrency = if limit == 0 { DEFAULT_CONCURRENCY } else { limit };
        self
    }

    /// Stop admitting new items after the first failure.
    pub fn with_stop_on_error(mut self, stop: bool) -> Self {
        self.config.stop_on_error = stop;
        self
    }

    /// Register a progress callback, invoked with `(finished, total)` as
    /// each item reaches a final outcome. Counts only; never partial results.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// The resolved configuration for this executor.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run `work` over `items` and return one outcome per item, in input
    /// order.
    ///
    /// Per item, in submission order: if the run is already cancelled the
    /// item is recorded as [`TaskError::Cancelled`] without spawning; if an
    /// earlier failure stopped the batch it is recorded as
    /// [`TaskError::Skipped`]; otherwise the coordinator waits for an
    /// execution slot and spawns a task that invokes the work function with
    /// the slot held. Every spawned task is joined before this returns, so
    /// no work outlives the call.
    #[instrument(skip_all, fields(item_count = items.len()))]
    pub async fn run<T, R, E, W>(
        &self,
        cancel: &CancellationToken,
        items: Vec<T>,
        work: W,
    ) -> Vec<BatchOutcome<R, E>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        W: Work<T, R, E> + 'static,
    {
        let run_start = Instant::now();
        let total = items.len();
        if total == 0 {
            debug!("empty batch, nothing to run");
            return Vec::new();
        }

        info!(
            total,
            concurrency = self.config.concurrency,
            stop_on_error = self.config.stop_on_error,
            "starting batch run"
        );

        let gate = Arc::new(AdmissionGate::new(self.config.concurrency));
        let stop = Arc::new(AtomicBool::new(false));
        let work = Arc::new(work);
        let finished = Arc::new(AtomicUsize::new(0));
        let stop_on_error = self.config.stop_on_error;

        let mut slots: Vec<Slot<R, E>> = Vec::with_capacity(total);

        for (index, item) in items.into_iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(index, "run cancelled, not dispatching item");
                self.record_progress(&finished, total);
                slots.push(Slot::Ready(BatchOutcome::failure(index, TaskError::Cancelled)));
                continue;
            }

            if stop_on_error && stop.load(Ordering::SeqCst) {
                debug!(index, "batch stopped after earlier failure, skipping item");
                self.record_progress(&finished, total);
                slots.push(Slot::Ready(BatchOutcome::failure(index, TaskError::Skipped)));
                continue;
            }

            // Admission happens here, in submission order, so the stop flag
            // and cancellation are observed deterministically even at low
            // concurrency. The slot moves into the task and is released on
            // every exit path when it drops.
            let slot = match gate.admit(cancel).await {
                Ok(slot) => slot,
                Err(err) => {
                    debug!(index, %err, "admission refused");
                    self.record_progress(&finished, total);
                    slots.push(Slot::Ready(BatchOutcome::failure(index, TaskError::Cancelled)));
                    continue;
                }
            };

            // A failure may have been recorded while we waited for the slot.
            if stop_on_error && stop.load(Ordering::SeqCst) {
                debug!(index, "batch stopped while waiting for admission, skipping item");
                drop(slot);
                self.record_progress(&finished, total);
                slots.push(Slot::Ready(BatchOutcome::failure(index, TaskError::Skipped)));
                continue;
            }

            let stop = Arc::clone(&stop);
            let work = Arc::clone(&work);
            let cancel = cancel.clone();
            let finished = Arc::clone(&finished);
            let progress = self.progress.clone();

            slots.push(Slot::Running(tokio::spawn(async move {
                let outcome =
                    run_one(index, item, slot, stop, stop_on_error, cancel, work).await;
                let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(callback) = &progress {
                    callback(done, total);
                }
                outcome
            })));
        }

        // Join every spawned task, even cancelled ones, so no task leaks
        // past this call.
        let mut outcomes = Vec::with_capacity(total);
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Slot::Ready(outcome) => outcomes.push(outcome),
                Slot::Running(handle) => match handle.await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(join_err) => {
                        warn!(index, error = %join_err, "task ended without an outcome");
                        outcomes.push(BatchOutcome::failure(
                            index,
                            TaskError::Panicked(join_err.to_string()),
                        ));
                    }
                },
            }
        }

        let summary = aggregate::summarize(&outcomes);
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            duration_ms = run_start.elapsed().as_millis() as u64,
            "batch run complete"
        );
        // More than one in five failed on a non-trivial batch.
        if summary.total > 5 && summary.failed * 5 > summary.total {
            warn!(
                failed = summary.failed,
                total = summary.total,
                "high failure rate in batch run"
            );
        }

        outcomes
    }

    fn record_progress(&self, finished: &AtomicUsize, total: usize) {
        let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(callback) = &self.progress {
            callback(done, total);
        }
    }
}

impl Default for BatchExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Invoke the work function for one admitted item. The gate slot is held
/// across the invocation (that hold is the concurrency bound itself) and
/// released when it drops, on success, error, or unwind.
async fn run_one<T, R, E, W>(
    index: usize,
    item: T,
    slot: GateSlot,
    stop: Arc<AtomicBool>,
    stop_on_error: bool,
    cancel: CancellationToken,
    work: Arc<W>,
) -> BatchOutcome<R, E>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    W: Work<T, R, E>,
{
    debug!(index, "invoking work");
    let outcome = match work.invoke(cancel, item).await {
        Ok(value) => BatchOutcome::success(index, value),
        Err(err) => {
            if stop_on_error {
                // Raised before the slot is released, so the coordinator's
                // post-admission check sees it for the next item.
                stop.store(true, Ordering::SeqCst);
                debug!(index, "work failed, stopping admission of new items");
            }
            BatchOutcome::failure(index, TaskError::Work(err))
        }
    };
    drop(slot);
    outcome
}
