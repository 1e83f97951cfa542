//! The work-function seam.
//!
//! The executor crosses exactly one side-effecting boundary: the caller's
//! work function, invoked once per admitted item. It is opaque to the
//! executor, which neither inspects nor classifies its error.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// One unit of caller-supplied work.
///
/// The run's cancellation token is passed through so long-running work can
/// poll it; the executor never interrupts work that has already started.
#[async_trait]
pub trait Work<T, R, E>: Send + Sync {
    /// Process a single item, producing a success value or an error.
    async fn invoke(&self, cancel: CancellationToken, item: T) -> Result<R, E>;
}

#[async_trait]
impl<T, R, E, F, Fut> Work<T, R, E> for F
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(CancellationToken, T) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<R, E>> + Send,
{
    async fn invoke(&self, cancel: CancellationToken, item: T) -> Result<R, E> {
        self(cancel, item).await
    }
}
