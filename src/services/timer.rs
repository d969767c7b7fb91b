//! Cancellable fixed-delay timers for session flows.
//!
//! DESIGN
//! ======
//! A `TimerSlot` holds at most one pending tokio task plus a generation
//! counter (the epoch). Arming a timer or invalidating the slot bumps the
//! epoch and aborts the previous task. The fire callback receives the epoch
//! it was armed with and must check `is_current` under the owner's lock
//! before mutating anything, so a task that raced past `abort` is a no-op.
//!
//! The same epoch also guards awaited work that is not a timer (e.g. an
//! estimation call made with the flow lock released).

use std::time::Duration;

use tokio::task::AbortHandle;

#[derive(Debug, Default)]
pub struct TimerSlot {
    epoch: u64,
    handle: Option<AbortHandle>,
}

impl TimerSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation. Capture before releasing a lock; compare after.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// `true` while an armed task has neither fired nor been cancelled.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel any pending task and start a new generation.
    pub fn invalidate(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.epoch
    }

    /// Mark the armed task as delivered. Called from the fire callback once
    /// it has applied its transition.
    pub fn disarm(&mut self) {
        self.handle = None;
    }

    /// Replace whatever is pending with a task that calls `fire(epoch)`
    /// after `delay`. Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let epoch = self.invalidate();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire(epoch);
        });
        self.handle = Some(task.abort_handle());
        epoch
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "timer_test.rs"]
mod tests;
