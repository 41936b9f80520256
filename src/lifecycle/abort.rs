//! Run-level abort coordination.

use std::sync::Arc;

use tokio::sync::watch;

/// Abort flag shared between the caller and a running engine.
///
/// Cloning yields another handle to the same flag. Once triggered it
/// stays triggered.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortSignal {
    /// Create a new, untriggered signal.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger the abort.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::warn!("Abort requested, no further work will be dispatched");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the signal has been triggered.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|aborted| *aborted).await;
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_is_shared_and_sticky() {
        let signal = AbortSignal::new();
        let handle = signal.clone();
        assert!(!signal.is_triggered());

        handle.trigger();
        handle.trigger();
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves() {
        let signal = AbortSignal::new();
        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.triggered().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.trigger();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
