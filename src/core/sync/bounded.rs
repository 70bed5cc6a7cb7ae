/*!
 * Bounded Buffer
 *
 * Fixed-capacity FIFO queue blocking producers when full and consumers
 * when empty
 */

use super::gate::{CancelToken, Gate, WaitResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::trace;

/// Capacity-bounded blocking FIFO queue.
///
/// `put` blocks while the queue is full, `take` while it is empty. Both
/// sides signal a single waiter on the opposite gate after mutating
/// (`notify_one`, not broadcast), so every waiter individually re-checks
/// its guard after waking.
///
/// Cancellation mid-wait abandons the operation and leaves the queue
/// untouched.
pub struct BoundedBuffer<T> {
    queue: Mutex<VecDeque<T>>,
    not_empty: Gate,
    not_full: Gate,
    capacity: usize,
}

impl<T> BoundedBuffer<T> {
    /// Create a buffer holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "bounded buffer requires capacity >= 1");
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Gate::new(),
            not_full: Gate::new(),
            capacity,
        }
    }

    /// Append `item`, blocking while the buffer is full.
    pub fn put(&self, item: T, token: &CancelToken) -> WaitResult<()> {
        let mut queue = self.queue.lock();
        while queue.len() == self.capacity {
            self.not_full.wait(&mut queue, token)?;
        }
        queue.push_back(item);
        debug_assert!(queue.len() <= self.capacity);
        trace!(len = queue.len(), "item enqueued");
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove and return the head, blocking while the buffer is empty.
    pub fn take(&self, token: &CancelToken) -> WaitResult<T> {
        let mut queue = self.queue.lock();
        while queue.is_empty() {
            self.not_empty.wait(&mut queue, token)?;
        }
        // The guard loop makes the front present here; a missing front
        // would mean a broken guard, which is a defect, not a condition.
        let item = queue
            .pop_front()
            .unwrap_or_else(|| unreachable!("non-empty queue had no front"));
        trace!(len = queue.len(), "item dequeued");
        self.not_full.notify_one();
        Ok(item)
    }

    /// Current occupancy, taken under the lock.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
