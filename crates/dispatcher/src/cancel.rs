//! Cooperative cancellation signal

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable stop request shared between a dispatcher and its owner
///
/// All clones observe the same flag. Cancelling is idempotent and cannot be
/// undone.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.tx.send_if_modified(|cancelled| !std::mem::replace(cancelled, true));
    }

    /// Non-blocking check
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once cancellation has been requested
    ///
    /// Returns immediately if the token is already cancelled. Cancel-safe.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
