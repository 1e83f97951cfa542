//! Pure helpers over a completed outcome sequence.
//!
//! These operate only on the returned data; they need nothing from the run
//! that produced it.

use crate::types::{BatchOutcome, TaskError};

/// Totals for one completed batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Number of outcomes in the sequence.
    pub total: usize,
    /// Items whose work function ran and succeeded.
    pub succeeded: usize,
    /// Items that failed, were cancelled, or were skipped.
    pub failed: usize,
}

/// Number of successful outcomes.
pub fn success_count<R, E>(outcomes: &[BatchOutcome<R, E>]) -> usize {
    outcomes.iter().filter(|o| o.is_success()).count()
}

/// Number of failed outcomes (work errors, cancellations, and skips alike).
pub fn failure_count<R, E>(outcomes: &[BatchOutcome<R, E>]) -> usize {
    outcomes.iter().filter(|o| !o.is_success()).count()
}

/// True when every item succeeded. The fast path for "did everything work".
pub fn all_succeeded<R, E>(outcomes: &[BatchOutcome<R, E>]) -> bool {
    outcomes.iter().all(BatchOutcome::is_success)
}

/// Success values in their original submission order; failures omitted.
pub fn successes<R, E>(outcomes: &[BatchOutcome<R, E>]) -> Vec<&R> {
    outcomes.iter().filter_map(BatchOutcome::value).collect()
}

/// Errors in the order they appear in the sequence.
pub fn failures<R, E>(outcomes: &[BatchOutcome<R, E>]) -> Vec<&TaskError<E>> {
    outcomes.iter().filter_map(BatchOutcome::error).collect()
}

/// Count the whole sequence in one pass.
pub fn summarize<R, E>(outcomes: &[BatchOutcome<R, E>]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: outcomes.len(),
        ..BatchSummary::default()
    };
    for outcome in outcomes {
        if outcome.is_success() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
    }
    summary
}
