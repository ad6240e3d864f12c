//! Trailing-edge debounce on top of `gloo-timers`.

use std::cell::RefCell;

use gloo_timers::callback::Timeout;

/// Runs the most recently scheduled callback once no new one has been
/// scheduled for `delay_ms`.
pub struct Debouncer {
    delay_ms: u32,
    pending: RefCell<Option<Timeout>>,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            pending: RefCell::new(None),
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Schedule `f`, cancelling whatever was scheduled before.
    pub fn schedule(&self, f: impl FnOnce() + 'static) {
        let timeout = Timeout::new(self.delay_ms, f);
        // Dropping a `Timeout` clears it.
        drop(self.pending.replace(Some(timeout)));
    }

    /// Cancel the scheduled callback, if any.
    pub fn cancel(&self) {
        drop(self.pending.borrow_mut().take());
    }
}
