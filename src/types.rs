//! Core data types for batch execution: configuration, per-task errors,
//! and indexed outcomes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Concurrency limit substituted when the caller leaves it unset (or sets 0).
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Configuration for one batch run.
///
/// Missing or out-of-range values are normalized rather than rejected: a
/// batch never fails because of a config omission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of work invocations in flight at once.
    pub concurrency: usize,
    /// Stop admitting new items after the first failure.
    pub stop_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            stop_on_error: false,
        }
    }
}

impl BatchConfig {
    /// Substitute defaults for values that cannot drive a run.
    pub fn normalized(mut self) -> Self {
        if self.concurrency == 0 {
            self.concurrency = DEFAULT_CONCURRENCY;
        }
        self
    }
}

/// Why an individual item did not produce a success value.
///
/// The executor never inspects the work error `E`; it is carried through
/// as a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError<E> {
    /// The run was cancelled before this item was admitted.
    #[error("batch cancelled before the task started")]
    Cancelled,

    /// An earlier item failed with stop-on-error enabled; this item was
    /// never attempted.
    #[error("task skipped after an earlier failure stopped the batch")]
    Skipped,

    /// The work function panicked instead of returning an error.
    #[error("work function panicked: {0}")]
    Panicked(String),

    /// The work function returned an error.
    #[error("work failed: {0}")]
    Work(E),
}

impl<E> TaskError<E> {
    /// True for run-level cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }

    /// True when the item was skipped because a sibling failure stopped
    /// the batch.
    pub fn is_skipped(&self) -> bool {
        matches!(self, TaskError::Skipped)
    }

    /// The work error, if this failure came from the work function.
    pub fn work_error(&self) -> Option<&E> {
        match self {
            TaskError::Work(err) => Some(err),
            _ => None,
        }
    }
}

/// Result of one item, keyed by its position in the submitted sequence.
///
/// Outcomes are created once when the item's task finishes (or is skipped)
/// and never mutated. The returned sequence is positional: `outcome[i].index
/// == i` regardless of completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<R, E> {
    /// Position of the item in the submitted sequence.
    pub index: usize,
    /// Success value, or the reason the item produced none.
    pub result: Result<R, TaskError<E>>,
}

impl<R, E> BatchOutcome<R, E> {
    /// Outcome for an item whose work function succeeded.
    pub fn success(index: usize, value: R) -> Self {
        Self {
            index,
            result: Ok(value),
        }
    }

    /// Outcome for an item that failed, was cancelled, or was skipped.
    pub fn failure(index: usize, error: TaskError<E>) -> Self {
        Self {
            index,
            result: Err(error),
        }
    }

    /// True if the work function ran and succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The success value, if any.
    pub fn value(&self) -> Option<&R> {
        self.result.as_ref().ok()
    }

    /// The error, if any.
    pub fn error(&self) -> Option<&TaskError<E>> {
        self.result.as_ref().err()
    }

    /// Unwrap into the underlying result, discarding the index.
    pub fn into_result(self) -> Result<R, TaskError<E>> {
        self.result
    }
}
