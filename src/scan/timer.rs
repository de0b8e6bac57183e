//! One-shot delayed task that can be cancelled or replaced.
//!
//! Scheduling a new task cancels the one in flight, so at most one callback is pending at
//! any time. Cancellation goes through a `tokio_util` [`CancellationToken`].

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Default)]
pub struct CancellableTimer {
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl CancellableTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` after `delay` unless cancelled first.
    ///
    /// Any previously scheduled callback is cancelled.
    pub fn schedule<F>(&mut self, delay: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        // the delay counts from now, not from the first poll of the task
        let deadline = tokio::time::Instant::now() + delay;
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    debug!("Delayed task cancelled");
                }
                _ = tokio::time::sleep_until(deadline) => {
                    callback();
                }
            }
        });

        self.token = Some(token);
        self.handle = Some(handle);
    }

    /// Cancel the pending callback.
    ///
    /// Returns whether a callback was still pending. Calling it again is a no-op.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.handle = None;
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        let running = self
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        let cancelled = self
            .token
            .as_ref()
            .is_none_or(|token| token.is_cancelled());
        running && !cancelled
    }
}

impl Drop for CancellableTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
