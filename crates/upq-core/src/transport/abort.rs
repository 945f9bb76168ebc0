//! Abort handle / signal pair for one in-flight transfer.

use tokio_util::sync::CancellationToken;

/// Registry-side end: invoking it asks the transport to stop.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    token: CancellationToken,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests abort. Idempotent; a no-op once the transfer has settled.
    pub fn invoke(&self) {
        self.token.cancel();
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            token: self.token.clone(),
        }
    }
}

/// Transport-side end: poll with [`AbortSignal::is_aborted`] from blocking
/// code, or await [`AbortSignal::aborted`] from async code.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn aborted(&self) {
        self.token.cancelled().await
    }
}
