//! Cooperative shutdown signal shared by the long-lived tasks.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable shutdown signal.
///
/// Every clone observes the same flag. Waiting is cancellation-safe and
/// returns immediately once the signal has been triggered.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Create a new signal in the non-shutdown state.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Trigger shutdown, waking every waiter.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Check if shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until shutdown is triggered.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as any clone of `self`, so `changed` only
        // errors if every handle is gone, which cannot happen while we hold one.
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
