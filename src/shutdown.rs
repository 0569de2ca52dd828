//! Process-wide stop request shared by the slot workers.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use zest_core::Shutdown;

/// Latching stop flag with a condition variable so idle workers sleep
/// until it is raised.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    requested: Mutex<bool>,
    cond: Condvar,
}

impl ShutdownSignal {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            requested: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Raise the flag and wake every waiter. The flag never resets.
    pub fn request(&self) {
        *self.lock() = true;
        self.cond.notify_all();
    }

    // A worker that panicked while holding the lock cannot leave the bool
    // in a torn state, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Shutdown for ShutdownSignal {
    fn is_requested(&self) -> bool {
        *self.lock()
    }

    fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut requested = self.lock();
        while !*requested {
            let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                break;
            };
            requested = self
                .cond
                .wait_timeout(requested, left)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_times_out_when_not_requested() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(!signal.is_requested());
    }

    #[test]
    fn test_request_wakes_waiter() {
        let signal = Arc::new(ShutdownSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait_timeout(Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        signal.request();
        assert!(waiter.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_request_latches() {
        let signal = ShutdownSignal::new();
        signal.request();
        signal.request();
        assert!(signal.is_requested());
        assert!(signal.wait_timeout(Duration::ZERO));
    }
}
