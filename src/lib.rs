//! # Batchgate
//!
//! A bounded-concurrency, order-preserving batch executor: given N
//! independent items and a concurrency limit, run them with at most K work
//! invocations in flight, collect one outcome per input at the input's
//! original position, and optionally halt admission of new work after the
//! first failure.
//!
//! The executor is agnostic to what the work actually is. Callers supply an
//! async work function `(cancel, item) -> Result<value, error>`; request
//! construction, transport, and retry all live on the caller's side of that
//! seam.
//!
//! ## Quick start
//!
//! ```rust
//! use batchgate::{aggregate, BatchExecutor};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let executor = BatchExecutor::new().with_concurrency(3);
//! let cancel = CancellationToken::new();
//!
//! let outcomes = executor
//!     .run(&cancel, vec![1u32, 2, 3], |_cancel: CancellationToken, n: u32| async move {
//!         Ok::<_, String>(n * 2)
//!     })
//!     .await;
//!
//! assert_eq!(outcomes.len(), 3);
//! assert_eq!(outcomes[1].index, 1);
//! assert_eq!(aggregate::success_count(&outcomes), 3);
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - The returned sequence always has one entry per input and
//!   `outcome[i].index == i`; completion order carries no meaning.
//! - At most `concurrency` work invocations execute simultaneously.
//! - [`BatchExecutor::run`] never fails as a whole; per-item failure lives
//!   in the individual [`BatchOutcome`] entries.
//! - Cancellation is cooperative: once the token fires no new work starts,
//!   but work already underway runs to completion and keeps its outcome.
//! - Every spawned task is joined before `run` returns.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// Aggregation helpers over completed outcome sequences.
pub mod aggregate;

/// Batch coordinator.
pub mod executor;

/// Admission gate bounding concurrent work.
pub mod gate;

/// Configuration, errors, and outcome types.
pub mod types;

/// The work-function trait.
pub mod work;

pub use aggregate::BatchSummary;
pub use executor::{BatchExecutor, ProgressFn};
pub use gate::{AdmissionError, AdmissionGate, GateSlot};
pub use types::{BatchConfig, BatchOutcome, TaskError, DEFAULT_CONCURRENCY};
pub use work::Work;
