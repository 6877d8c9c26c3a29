use std::time::Duration;

use parking_lot::{Condvar, MutexGuard};

use crate::clock::Clock;

/// Condition variable with absolute-deadline timed waits.
///
/// Pairs with exactly one `parking_lot::Mutex`. [`wait_until`] keeps the
/// caller's guard across wakeups and re-evaluates the predicate under the
/// lock, so spurious wakeups and stray signals just loop.
///
/// [`wait_until`]: Self::wait_until
pub struct DeadlineWaiter {
    cvar: Condvar,
}

impl DeadlineWaiter {
    pub fn new() -> Self {
        DeadlineWaiter {
            cvar: Condvar::new(),
        }
    }

    /// Wakes every thread blocked in [`wait_until`](Self::wait_until).
    pub fn notify_all(&self) {
        self.cvar.notify_all();
    }

    /// Blocks until `ready` holds or `deadline_ms` passes on `clock`.
    ///
    /// Returns true if the predicate became true before the deadline. The
    /// deadline is absolute: a deadline already in the past still returns
    /// true when the predicate holds, and returns false without blocking
    /// otherwise. On every wakeup the remaining time is recomputed from
    /// the clock before re-waiting.
    pub fn wait_until<T>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        clock: &dyn Clock,
        deadline_ms: i64,
        mut ready: impl FnMut(&T) -> bool,
    ) -> bool {
        while !ready(&**guard) {
            let remaining_ms = deadline_ms - clock.now_ms();
            if remaining_ms <= 0 {
                return false;
            }
            self.cvar
                .wait_for(guard, Duration::from_millis(remaining_ms as u64));
        }
        true
    }
}

impl Default for DeadlineWaiter {
    fn default() -> Self {
        Self::new()
    }
}
