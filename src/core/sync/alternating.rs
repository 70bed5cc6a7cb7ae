/*!
 * Turn-Alternating Coordinator
 *
 * Bounded buffer whose successful operations strictly alternate between
 * the producer and consumer groups
 */

use super::gate::{CancelToken, Gate, WaitResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::trace;

/// The group currently permitted to make progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Producers,
    Consumers,
}

struct AltState<T> {
    queue: VecDeque<T>,
    turn: Turn,
}

/// Bounded FIFO buffer enforcing strict producer/consumer alternation.
///
/// A put is eligible only on `Turn::Producers` with space available; a
/// take only on `Turn::Consumers` with an item present. Each success
/// flips the turn and broadcasts the opposite group's turn gate
/// (`notify_all`) so every blocked member re-checks its guard; buffer
/// occupancy then decides who truly proceeds.
///
/// The alternation is intentionally stricter than plain bounded-buffer
/// semantics: even with capacity > 1, no two puts succeed without an
/// intervening take, so occupancy never exceeds 1 once running. This is
/// the documented behavior being demonstrated.
pub struct AlternatingBuffer<T> {
    state: Mutex<AltState<T>>,
    producers_turn: Gate,
    consumers_turn: Gate,
    not_full: Gate,
    not_empty: Gate,
    capacity: usize,
}

impl<T> AlternatingBuffer<T> {
    /// Create a coordinator over a queue of at most `capacity` items.
    /// Producers move first.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "alternating buffer requires capacity >= 1");
        Self {
            state: Mutex::new(AltState {
                queue: VecDeque::with_capacity(capacity),
                turn: Turn::Producers,
            }),
            producers_turn: Gate::new(),
            consumers_turn: Gate::new(),
            not_full: Gate::new(),
            not_empty: Gate::new(),
            capacity,
        }
    }

    /// Append `item` once it is the producers' turn and space is free,
    /// then hand the turn to the consumers.
    pub fn put(&self, item: T, token: &CancelToken) -> WaitResult<()> {
        let mut state = self.state.lock();
        while state.turn != Turn::Producers || state.queue.len() >= self.capacity {
            if state.turn != Turn::Producers {
                self.producers_turn.wait(&mut state, token)?;
            } else {
                self.not_full.wait(&mut state, token)?;
            }
        }
        state.queue.push_back(item);
        debug_assert!(state.queue.len() <= self.capacity);
        state.turn = Turn::Consumers;
        trace!(len = state.queue.len(), "item enqueued, consumers' turn");
        self.consumers_turn.notify_all();
        Ok(())
    }

    /// Remove the head once it is the consumers' turn and an item is
    /// present, then hand the turn back to the producers.
    pub fn take(&self, token: &CancelToken) -> WaitResult<T> {
        let mut state = self.state.lock();
        while state.turn != Turn::Consumers || state.queue.is_empty() {
            if state.turn != Turn::Consumers {
                self.consumers_turn.wait(&mut state, token)?;
            } else {
                self.not_empty.wait(&mut state, token)?;
            }
        }
        let item = state
            .queue
            .pop_front()
            .unwrap_or_else(|| unreachable!("non-empty queue had no front"));
        state.turn = Turn::Producers;
        trace!(len = state.queue.len(), "item dequeued, producers' turn");
        self.producers_turn.notify_all();
        Ok(item)
    }

    /// The group currently allowed to act, read under the lock.
    pub fn turn(&self) -> Turn {
        self.state.lock().turn
    }

    /// Current occupancy, taken under the lock.
    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().queue.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
