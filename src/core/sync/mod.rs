/*!
 * Synchronization Primitives
 *
 * Lock/condition-gate coordinated buffers demonstrating the classic
 * producer/consumer protocols under increasingly strict ordering rules:
 * - Capacity-bounded blocking (FIFO)
 * - Unbounded blocking stack (LIFO, blocks consumers only)
 * - Strict producer/consumer turn alternation
 * - Intra-group peer sequencing on top of a bounded buffer
 *
 * # Architecture
 *
 * Every buffer owns one `parking_lot::Mutex` guarding its queue and any
 * turn state, plus one `Gate` (condition variable) per guard predicate.
 * All mutation happens inside the critical section; all blocking happens
 * suspended on a gate with the lock released.
 *
 * # Guard recheck loops
 *
 * Waiters always re-test their predicate in a loop after every wake.
 * Signals use `notify_one` or `notify_all` exactly as each protocol
 * demands, and a woken waiter may find another task raced in ahead of it.
 */

mod alternating;
mod bounded;
mod gate;
mod sequenced;
mod stack;

pub use alternating::{AlternatingBuffer, Turn};
pub use bounded::BoundedBuffer;
pub use gate::{CancelToken, Gate, WaitError, WaitResult};
pub use sequenced::{ConsumeCancelled, ProduceCancelled, SequencedBuffer};
pub use stack::BlockingStack;
