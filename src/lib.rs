/*!
 * Turnwise Library
 * Blocking producer/consumer buffers coordinated with explicit locks
 * and condition gates
 */

pub mod core;
pub mod driver;
pub mod monitoring;

// Re-exports
pub use crate::core::sync::{
    AlternatingBuffer, BlockingStack, BoundedBuffer, CancelToken, ConsumeCancelled, Gate,
    ProduceCancelled, SequencedBuffer, Turn, WaitError, WaitResult,
};
pub use driver::{run, DriverError, Exercise, RunReport, WorkloadConfig};
pub use monitoring::init_tracing;
