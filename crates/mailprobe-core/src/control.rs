//! Cooperative shutdown: one set-once flag shared by the probe dispatch loop
//! and the archival scheduler.
//!
//! Both loops observe the same signal. The dispatch loop stops launching new
//! probes but lets in-flight ones finish; the archival loop wakes immediately
//! from its interval sleep instead of polling a flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared run-wide shutdown signal. Cheap to clone; all clones observe the
/// same flag. Set at most once; later triggers are no-ops.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    triggered: AtomicBool,
    notify: Notify,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter. Returns true only for the call that
    /// actually set it, so callers can log the transition exactly once.
    pub fn trigger(&self) -> bool {
        let first = !self.inner.triggered.swap(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
        first
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Resolves once the signal fires (immediately if it already has).
    /// Registers with the notifier before checking the flag, so a trigger
    /// racing this call cannot be missed.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}
