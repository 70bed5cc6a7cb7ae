/*!
 * Intra-Group Sequencer
 *
 * Bounded buffer that serializes producers among themselves and consumers
 * among themselves via peer handoff gates
 */

use super::gate::{CancelToken, Gate, WaitResult};
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::trace;

/// Cancellation outcome of a produce run, reporting how many items had
/// already been enqueued when the wait was abandoned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("produce run cancelled after {produced} items")]
pub struct ProduceCancelled {
    pub produced: usize,
}

/// Cancellation outcome of a consume run, carrying the items dequeued
/// before the wait was abandoned so they are not silently dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("consume run cancelled after {} items", .taken.len())]
pub struct ConsumeCancelled<T> {
    pub taken: Vec<T>,
}

#[derive(Clone, Copy)]
enum Group {
    Producers,
    Consumers,
}

struct SeqState<T> {
    queue: VecDeque<T>,
    // Pending peer handoffs per group. A handoff published while no peer
    // is parked is retained here instead of being lost, so the group
    // cannot deadlock on a missed signal.
    producer_batons: usize,
    consumer_batons: usize,
}

/// Bounded FIFO buffer with intra-group peer sequencing.
///
/// Each task runs a fixed quota of operations. After every mutation it
/// signals the opposite group's occupancy gate once (`notify_one`), then
/// publishes a handoff to one peer of its own group and parks until a
/// peer hands back, so that within a group's turn only one member acts
/// before yielding. Which peer claims a handoff is scheduler-determined.
///
/// After its final operation a task still publishes the handoff before
/// exiting; without that the remaining peers of its group would park
/// forever.
pub struct SequencedBuffer<T> {
    state: Mutex<SeqState<T>>,
    not_full: Gate,
    not_empty: Gate,
    producer_peer: Gate,
    consumer_peer: Gate,
    capacity: usize,
}

impl<T> SequencedBuffer<T> {
    /// Create a sequencer over a queue of at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "sequenced buffer requires capacity >= 1");
        Self {
            state: Mutex::new(SeqState {
                queue: VecDeque::with_capacity(capacity),
                producer_batons: 0,
                consumer_batons: 0,
            }),
            not_full: Gate::new(),
            not_empty: Gate::new(),
            producer_peer: Gate::new(),
            consumer_peer: Gate::new(),
            capacity,
        }
    }

    /// Produce `quota` items, yielding to a producer peer between
    /// iterations.
    ///
    /// The handoff is published *before* parking, so a task cancelled
    /// mid-wait after mutating has already propagated its peer signal and
    /// cannot strand the rest of its group. Returns the number of items
    /// produced (always `quota` on success); a cancellation outcome
    /// reports how many made it in first.
    pub fn produce_run<F>(
        &self,
        quota: usize,
        mut make_item: F,
        token: &CancelToken,
    ) -> Result<usize, ProduceCancelled>
    where
        F: FnMut(usize) -> T,
    {
        for i in 0..quota {
            let mut state = self.state.lock();
            while state.queue.len() >= self.capacity {
                if self.not_full.wait(&mut state, token).is_err() {
                    return Err(ProduceCancelled { produced: i });
                }
            }
            state.queue.push_back(make_item(i));
            debug_assert!(state.queue.len() <= self.capacity);
            trace!(len = state.queue.len(), iteration = i, "item enqueued");
            self.not_empty.notify_one();

            state.producer_batons += 1;
            self.producer_peer.notify_one();
            if i + 1 < quota
                && self
                    .claim_baton(Group::Producers, &mut state, token)
                    .is_err()
            {
                return Err(ProduceCancelled { produced: i + 1 });
            }
        }
        Ok(quota)
    }

    /// Consume `quota` items, yielding to a consumer peer between
    /// iterations. Returns the items in the order they were taken; a
    /// cancellation outcome still carries everything dequeued so far.
    pub fn consume_run(
        &self,
        quota: usize,
        token: &CancelToken,
    ) -> Result<Vec<T>, ConsumeCancelled<T>> {
        let mut taken = Vec::with_capacity(quota);
        for i in 0..quota {
            let mut state = self.state.lock();
            while state.queue.is_empty() {
                if self.not_empty.wait(&mut state, token).is_err() {
                    drop(state);
                    return Err(ConsumeCancelled { taken });
                }
            }
            let item = state
                .queue
                .pop_front()
                .unwrap_or_else(|| unreachable!("non-empty queue had no front"));
            trace!(len = state.queue.len(), iteration = i, "item dequeued");
            self.not_full.notify_one();
            taken.push(item);

            state.consumer_batons += 1;
            self.consumer_peer.notify_one();
            if i + 1 < quota
                && self
                    .claim_baton(Group::Consumers, &mut state, token)
                    .is_err()
            {
                drop(state);
                return Err(ConsumeCancelled { taken });
            }
        }
        Ok(taken)
    }

    /// Park on the group's peer gate, then claim one pending handoff.
    ///
    /// Parking at least once before claiming gives an already-waiting
    /// peer first chance at the handoff this task just published; if no
    /// peer is parked the task reclaims it after the park slice and
    /// continues alone.
    fn claim_baton(
        &self,
        group: Group,
        state: &mut MutexGuard<'_, SeqState<T>>,
        token: &CancelToken,
    ) -> WaitResult<()> {
        let gate = match group {
            Group::Producers => &self.producer_peer,
            Group::Consumers => &self.consumer_peer,
        };
        loop {
            gate.wait(state, token)?;
            let batons = match group {
                Group::Producers => &mut state.producer_batons,
                Group::Consumers => &mut state.consumer_batons,
            };
            if *batons > 0 {
                *batons -= 1;
                return Ok(());
            }
        }
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
