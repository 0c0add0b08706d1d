//! Runs one timed, cancellable listing against the backend.
//!
//! The backend call runs in its own task so that a timeout or an explicit
//! cancel can abort it outright instead of just ignoring its result.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::browse::state::Settlement;
use crate::error::BrowseError;
use crate::fs::backend::ListingBackend;

/// Cancels one in-flight listing. Cloning shares the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    notify: Arc<Notify>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the listing. A cancel issued before the listing starts waiting
    /// is still observed.
    pub fn cancel(&self) {
        self.notify.notify_one();
    }

    async fn cancelled(&self) {
        self.notify.notified().await;
    }
}

/// Aborts the wrapped task when dropped, including when the owning future
/// is dropped mid-await.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Performs single listings; never retries on its own.
#[derive(Clone)]
pub struct BrowseRequestExecutor {
    backend: Arc<dyn ListingBackend>,
}

impl BrowseRequestExecutor {
    pub fn new(backend: Arc<dyn ListingBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn ListingBackend> {
        &self.backend
    }

    /// List `path`, giving up after `timeout` or when `cancel` fires.
    ///
    /// Always settles: every failure, including timeout, cancellation and a
    /// panicking backend, comes back as [`Settlement::Failed`].
    pub async fn execute(
        &self,
        path: &Path,
        timeout: Duration,
        risky: bool,
        cancel: &CancelToken,
    ) -> Settlement {
        let backend = Arc::clone(&self.backend);
        let target = path.to_path_buf();
        let mut task = AbortOnDrop(tokio::spawn(async move { backend.list(&target).await }));

        tokio::select! {
            joined = &mut task.0 => match joined {
                Ok(Ok(resp)) => Settlement::Listed(resp),
                Ok(Err(err)) => Settlement::Failed(err),
                Err(join_err) => {
                    warn!(path = %path.display(), "listing task failed: {}", join_err);
                    Settlement::Failed(BrowseError::Unknown(join_err.to_string()))
                }
            },
            _ = tokio::time::sleep(timeout) => {
                warn!(path = %path.display(), ?timeout, "listing timed out");
                Settlement::Failed(BrowseError::Timeout { risky })
            }
            _ = cancel.cancelled() => {
                warn!(path = %path.display(), "listing cancelled");
                Settlement::Failed(BrowseError::Timeout { risky })
            }
        }
    }
}
