//! Admission gate: a counting semaphore that caps how many work functions
//! may be in flight at once.
//!
//! The gate is the only mechanism enforcing the concurrency ceiling. A
//! successful admission hands back a [`GateSlot`] whose drop returns the
//! slot, so release is guaranteed on every exit path, including panics in
//! the work function.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Errors that can occur while waiting for an execution slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The run's cancellation signal fired before a slot became free.
    #[error("cancelled while waiting for an execution slot")]
    Cancelled,

    /// The underlying semaphore was closed.
    #[error("admission gate has been closed")]
    Closed,
}

/// Bounded-capacity concurrency limiter.
///
/// Capacity is fixed for the lifetime of the gate. A capacity of zero is
/// clamped to one; the executor substitutes its own default before the gate
/// is ever built, so the clamp only guards direct construction.
#[derive(Debug)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionGate {
    /// Create a gate admitting at most `capacity` concurrent holders.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Maximum number of concurrent slot holders.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait until a slot is free or the run is cancelled, whichever comes
    /// first. On cancellation the caller must not run its work function.
    pub async fn admit(&self, cancel: &CancellationToken) -> Result<GateSlot, AdmissionError> {
        tokio::select! {
            // cancellation wins when both are ready
            biased;
            _ = cancel.cancelled() => Err(AdmissionError::Cancelled),
            permit = self.semaphore.clone().acquire_owned() => permit
                .map(|permit| GateSlot { _permit: permit })
                .map_err(|_| AdmissionError::Closed),
        }
    }
}

/// Held proof of admission; dropping it frees the slot.
#[derive(Debug)]
pub struct GateSlot {
    _permit: OwnedSemaphorePermit,
}
