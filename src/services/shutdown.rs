//! Shutdown coordination
//!
//! A [`ShutdownController`] is cloned into the HTTP state, the signal
//! listener and the panic hook. The first trigger wins; later triggers are
//! no-ops.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

/// Why shutdown was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// A panic escaped somewhere in the process
    Panic,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShutdownReason::Interrupt => "interrupt",
            ShutdownReason::Terminate => "terminate",
            ShutdownReason::Panic => "panic",
        };
        f.write_str(s)
    }
}

struct Inner {
    triggered: AtomicBool,
    tx: watch::Sender<Option<ShutdownReason>>,
}

/// Idempotent, cloneable shutdown trigger
#[derive(Clone)]
pub struct ShutdownController {
    inner: Arc<Inner>,
}

impl ShutdownController {
    /// Create an untriggered controller
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                tx,
            }),
        }
    }

    /// Request shutdown. Returns `true` only for the call that started it.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        if self.inner.triggered.swap(true, Ordering::SeqCst) {
            tracing::debug!(%reason, "Shutdown already in progress, ignoring");
            return false;
        }
        tracing::info!(%reason, "Shutdown requested");
        self.inner.tx.send_replace(Some(reason));
        true
    }

    /// Whether shutdown has been requested
    pub fn is_shutting_down(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Reason of the first trigger, if any
    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.inner.tx.borrow()
    }

    /// Resolve once shutdown has been requested
    pub async fn triggered(&self) -> ShutdownReason {
        let mut rx = self.inner.tx.subscribe();
        loop {
            if let Some(reason) = *rx.borrow_and_update() {
                return reason;
            }
            if rx.changed().await.is_err() {
                // sender lives in `inner`, which we hold
                return ShutdownReason::Terminate;
            }
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShutdownController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownController")
            .field("shutting_down", &self.is_shutting_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_is_idempotent() {
        let controller = ShutdownController::new();
        assert!(!controller.is_shutting_down());
        assert!(controller.reason().is_none());

        assert!(controller.trigger(ShutdownReason::Terminate));
        assert!(!controller.trigger(ShutdownReason::Interrupt));

        assert!(controller.is_shutting_down());
        assert_eq!(controller.reason(), Some(ShutdownReason::Terminate));
    }

    #[test]
    fn test_clones_share_state() {
        let controller = ShutdownController::new();
        let clone = controller.clone();
        clone.trigger(ShutdownReason::Panic);
        assert!(controller.is_shutting_down());
    }

    #[tokio::test]
    async fn test_triggered_wakes_waiters() {
        let controller = ShutdownController::new();
        let waiter = {
            let c = controller.clone();
            tokio::spawn(async move { c.triggered().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.trigger(ShutdownReason::Interrupt);

        let reason = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reason, ShutdownReason::Interrupt);
    }

    #[tokio::test]
    async fn test_triggered_after_the_fact() {
        let controller = ShutdownController::new();
        controller.trigger(ShutdownReason::Terminate);
        assert_eq!(controller.triggered().await, ShutdownReason::Terminate);
    }
}
