/*!
 * Condition Gate
 *
 * A named condition variable tied to the owning buffer's mutex, with
 * cancellation-aware parking
 */

use parking_lot::{Condvar, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Upper bound on a single park before the token is re-checked.
///
/// Cancellation is observed at this granularity; a signal still wakes the
/// waiter immediately.
const PARK_SLICE: Duration = Duration::from_millis(2);

/// Result type for blocking operations
pub type WaitResult<T> = Result<T, WaitError>;

/// Blocking operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    #[error("Wait was cancelled")]
    Cancelled,
}

/// Cooperative cancellation handle for tasks parked on a gate.
///
/// Cheap to clone; `cancel()` is sticky and visible to every clone. A task
/// observing cancellation abandons its wait, releases the lock on return,
/// and leaves shared state untouched.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A condition gate associated with one buffer's mutex.
///
/// Several independent gates may share a single lock (e.g. "not-full" and
/// "not-empty" on one bounded buffer). `wait` atomically releases the lock
/// while parked and re-acquires it before returning.
///
/// Callers must re-test their guard predicate in a loop after every wake:
/// wakes may be spurious, stale (another waiter raced in first), or just
/// the park slice expiring. No fairness guarantee on which waiter wakes.
#[derive(Debug, Default)]
pub struct Gate {
    cv: Condvar,
}

impl Gate {
    pub const fn new() -> Self {
        Self { cv: Condvar::new() }
    }

    /// Park on this gate until signaled, the park slice expires, or the
    /// token is cancelled.
    ///
    /// Returns `Ok(())` on any wake; the caller's guard loop decides
    /// whether to proceed. Returns `Err(WaitError::Cancelled)` once the
    /// token is cancelled, with the lock released as the guard unwinds.
    pub fn wait<T: ?Sized>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        token: &CancelToken,
    ) -> WaitResult<()> {
        if token.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        let _ = self.cv.wait_for(guard, PARK_SLICE);
        if token.is_cancelled() {
            return Err(WaitError::Cancelled);
        }
        Ok(())
    }

    /// Wake one waiter. Returns true if a waiter was woken.
    #[inline]
    pub fn notify_one(&self) -> bool {
        self.cv.notify_one()
    }

    /// Wake all waiters. Returns the number woken.
    #[inline]
    pub fn notify_all(&self) -> usize {
        self.cv.notify_all()
    }
}
