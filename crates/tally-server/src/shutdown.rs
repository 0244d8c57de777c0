//! Shutdown signalling for the serve loop.
//!
//! One `CancellationToken` ends `axum::serve`; `drain` then gives the server
//! task the configured grace period to finish in-flight requests.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Signals the server to stop and waits for it to wind down.
pub struct ShutdownCoordinator {
    token: CancellationToken,
    grace: Duration,
}

impl ShutdownCoordinator {
    /// Coordinator that waits up to `grace` for the server task.
    pub fn new(grace: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            grace,
        }
    }

    /// Ask the server to stop accepting connections.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown is requested.
    pub(crate) fn signalled(&self) -> impl Future<Output = ()> + Send + 'static {
        let token = self.token.clone();
        async move { token.cancelled().await }
    }

    /// Request shutdown, then wait out the grace period for `server`.
    ///
    /// Returns the task's output, or `None` if it panicked or outlived the
    /// grace period.
    pub async fn drain<T>(&self, server: JoinHandle<T>) -> Option<T> {
        self.shutdown();
        info!(grace_secs = self.grace.as_secs(), "draining server");

        match tokio::time::timeout(self.grace, server).await {
            Ok(Ok(output)) => Some(output),
            Ok(Err(e)) => {
                warn!(error = %e, "server task failed");
                None
            }
            Err(_) => {
                warn!(grace = ?self.grace, "server did not stop within the grace period");
                None
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
