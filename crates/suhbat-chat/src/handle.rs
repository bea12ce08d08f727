//! A cloneable handle for observing and aborting the active stream.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio_util::sync::CancellationToken;

/// A cloneable handle for observing and aborting the active stream.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct StreamHandle {
    cancel: Arc<Mutex<CancellationToken>>,
    idle_notify: Arc<tokio::sync::Notify>,
    is_streaming: Arc<AtomicBool>,
}

impl Default for StreamHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamHandle {
    pub(crate) fn new() -> Self {
        Self {
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            idle_notify: Arc::new(tokio::sync::Notify::new()),
            is_streaming: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the single stream slot. Returns a fresh cancellation token for
    /// the new stream, or `None` if one is already running.
    pub(crate) fn try_begin(&self) -> Option<CancellationToken> {
        if self
            .is_streaming
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        Some(token)
    }

    /// Release the stream slot and wake idle waiters
    pub(crate) fn finish(&self) {
        self.is_streaming.store(false, Ordering::Release);
        self.idle_notify.notify_waiters();
    }

    /// Abort the current stream, if any.
    pub fn abort(&self) {
        self.cancel.lock().cancel();
    }

    /// Whether a stream is currently running.
    pub fn is_streaming(&self) -> bool {
        self.is_streaming.load(Ordering::Acquire)
    }

    /// Wait until no stream is running.
    pub async fn wait_for_idle(&self) {
        let notified = self.idle_notify.notified();
        if !self.is_streaming() {
            return;
        }
        notified.await;
    }

    /// Wait until idle, with a timeout.
    /// Returns `true` if idle was reached, `false` on timeout.
    pub async fn wait_for_idle_timeout(&self, timeout: std::time::Duration) -> bool {
        if !self.is_streaming() {
            return true;
        }
        tokio::time::timeout(timeout, self.wait_for_idle())
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_slot() {
        let handle = StreamHandle::new();
        let token = handle.try_begin().unwrap();
        assert!(handle.is_streaming());
        assert!(handle.try_begin().is_none());

        handle.abort();
        assert!(token.is_cancelled());

        handle.finish();
        assert!(!handle.is_streaming());
        let next = handle.try_begin().unwrap();
        assert!(!next.is_cancelled());
    }

    #[tokio::test]
    async fn test_wait_for_idle() {
        let handle = StreamHandle::new();
        assert!(handle.wait_for_idle_timeout(std::time::Duration::from_millis(10)).await);

        handle.try_begin().unwrap();
        assert!(!handle.wait_for_idle_timeout(std::time::Duration::from_millis(10)).await);

        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.wait_for_idle().await });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        handle.finish();
        task.await.unwrap();
    }
}
