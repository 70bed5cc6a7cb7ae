/*!
 * Blocking Stack
 *
 * Unbounded LIFO container blocking consumers only
 */

use super::gate::{CancelToken, Gate, WaitResult};
use parking_lot::Mutex;
use std::time::Duration;
use tracing::trace;

/// Unbounded blocking stack.
///
/// `push` never blocks; `pop` blocks while the stack is empty, using the
/// same guard-recheck discipline as the bounded buffer. There is no
/// full-side gate.
pub struct BlockingStack<T> {
    items: Mutex<Vec<T>>,
    not_empty: Gate,
    probe_delay: Duration,
}

impl<T> BlockingStack<T> {
    pub fn new() -> Self {
        Self::with_probe_delay(Duration::ZERO)
    }

    /// Create a stack whose `is_empty` query sleeps for `probe_delay`
    /// after reading, modeling a slow instrumented query path for
    /// contention stress tests.
    pub fn with_probe_delay(probe_delay: Duration) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            not_empty: Gate::new(),
            probe_delay,
        }
    }

    /// Push `item` on top of the stack. Never blocks.
    pub fn push(&self, item: T) {
        let mut items = self.items.lock();
        items.push(item);
        trace!(len = items.len(), "item pushed");
        self.not_empty.notify_one();
    }

    /// Remove and return the top item, blocking while the stack is empty.
    pub fn pop(&self, token: &CancelToken) -> WaitResult<T> {
        let mut items = self.items.lock();
        while items.is_empty() {
            self.not_empty.wait(&mut items, token)?;
        }
        let item = items
            .pop()
            .unwrap_or_else(|| unreachable!("non-empty stack had no top"));
        trace!(len = items.len(), "item popped");
        Ok(item)
    }

    /// Whether the stack is empty, read under the lock.
    ///
    /// The read itself is pure; the configured probe delay runs after the
    /// lock is released.
    pub fn is_empty(&self) -> bool {
        let empty = self.items.lock().is_empty();
        if !self.probe_delay.is_zero() {
            std::thread::sleep(self.probe_delay);
        }
        empty
    }

    /// Current depth, taken under the lock.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }
}

impl<T> Default for BlockingStack<T> {
    fn default() -> Self {
        Self::new()
    }
}
