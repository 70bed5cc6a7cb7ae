/*!
 * Workload Driver
 *
 * Spawns producer and consumer threads against one shared buffer
 * instance, joins them, and reports the final size as a consistency
 * check
 */

mod config;

pub use config::WorkloadConfig;

use crate::core::sync::{
    AlternatingBuffer, BlockingStack, BoundedBuffer, CancelToken, SequencedBuffer, WaitError,
};
use std::str::FromStr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Buffer variant a workload runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exercise {
    /// Capacity-bounded blocking FIFO
    Bounded,
    /// Unbounded blocking stack
    Stack,
    /// Strict producer/consumer turn alternation
    Alternating,
    /// Intra-group peer sequencing
    Sequenced,
}

impl FromStr for Exercise {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bounded" => Ok(Self::Bounded),
            "stack" => Ok(Self::Stack),
            "alternating" => Ok(Self::Alternating),
            "sequenced" => Ok(Self::Sequenced),
            other => Err(DriverError::UnknownExercise(other.to_string())),
        }
    }
}

/// Driver errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("unknown exercise '{0}' (expected bounded, stack, alternating or sequenced)")]
    UnknownExercise(String),

    #[error("unbalanced workload: {produced} puts against {consumed} takes would never terminate")]
    UnbalancedWorkload { produced: usize, consumed: usize },

    #[error("buffer capacity must be at least 1")]
    InvalidCapacity,

    #[error("worker thread panicked")]
    WorkerPanicked,
}

/// Outcome of one workload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Successful puts across all producers
    pub produced: usize,
    /// Successful takes across all consumers
    pub consumed: usize,
    /// Buffer occupancy after every task joined
    pub final_len: usize,
}

/// Run `config` against the chosen buffer variant and wait for every
/// task to finish.
///
/// The buffer is constructed here and handed to each task as a shared
/// `Arc`; completion is a blocking join on every handle, not a poll
/// loop.
pub fn run(exercise: Exercise, config: &WorkloadConfig) -> Result<RunReport, DriverError> {
    if config.total_produced() != config.total_consumed() {
        return Err(DriverError::UnbalancedWorkload {
            produced: config.total_produced(),
            consumed: config.total_consumed(),
        });
    }
    if exercise != Exercise::Stack && config.capacity == 0 {
        return Err(DriverError::InvalidCapacity);
    }

    info!(?exercise, ?config, "starting workload");
    let report = match exercise {
        Exercise::Bounded => run_bounded(config),
        Exercise::Stack => run_stack(config),
        Exercise::Alternating => run_alternating(config),
        Exercise::Sequenced => run_sequenced(config),
    }?;
    info!(
        produced = report.produced,
        consumed = report.consumed,
        final_len = report.final_len,
        "workload finished"
    );
    Ok(report)
}

/// Item identity: producer index and iteration folded into one u64 so
/// tests can detect loss or duplication.
fn item_id(producer: usize, iteration: usize, quota: usize) -> u64 {
    (producer * quota + iteration) as u64
}

fn run_bounded(config: &WorkloadConfig) -> Result<RunReport, DriverError> {
    let buffer = Arc::new(BoundedBuffer::new(config.capacity));
    let token = CancelToken::new();

    let producers: Vec<_> = (0..config.producers)
        .map(|p| {
            let buffer = buffer.clone();
            let token = token.clone();
            let quota = config.quota;
            thread::spawn(move || {
                let mut done = 0;
                for i in 0..quota {
                    match buffer.put(item_id(p, i, quota), &token) {
                        Ok(()) => done += 1,
                        Err(WaitError::Cancelled) => {
                            warn!(producer = p, "put cancelled mid-wait");
                            break;
                        }
                    }
                }
                debug!(producer = p, done, "producer finished");
                done
            })
        })
        .collect();

    let consumers: Vec<_> = (0..config.consumers)
        .map(|c| {
            let buffer = buffer.clone();
            let token = token.clone();
            let quota = config.quota;
            thread::spawn(move || {
                let mut done = 0;
                for _ in 0..quota {
                    match buffer.take(&token) {
                        Ok(_) => done += 1,
                        Err(WaitError::Cancelled) => {
                            warn!(consumer = c, "take cancelled mid-wait");
                            break;
                        }
                    }
                }
                debug!(consumer = c, done, "consumer finished");
                done
            })
        })
        .collect();

    let produced = join_counts(producers)?;
    let consumed = join_counts(consumers)?;
    Ok(RunReport {
        produced,
        consumed,
        final_len: buffer.len(),
    })
}

fn run_stack(config: &WorkloadConfig) -> Result<RunReport, DriverError> {
    let stack = Arc::new(BlockingStack::new());
    let token = CancelToken::new();

    let producers: Vec<_> = (0..config.producers)
        .map(|p| {
            let stack = stack.clone();
            let quota = config.quota;
            thread::spawn(move || {
                for i in 0..quota {
                    stack.push(item_id(p, i, quota));
                }
                debug!(producer = p, done = quota, "producer finished");
                quota
            })
        })
        .collect();

    let consumers: Vec<_> = (0..config.consumers)
        .map(|c| {
            let stack = stack.clone();
            let token = token.clone();
            let quota = config.quota;
            thread::spawn(move || {
                let mut done = 0;
                for _ in 0..quota {
                    match stack.pop(&token) {
                        Ok(_) => done += 1,
                        Err(WaitError::Cancelled) => {
                            warn!(consumer = c, "pop cancelled mid-wait");
                            break;
                        }
                    }
                }
                debug!(consumer = c, done, "consumer finished");
                done
            })
        })
        .collect();

    let produced = join_counts(producers)?;
    let consumed = join_counts(consumers)?;
    Ok(RunReport {
        produced,
        consumed,
        final_len: stack.len(),
    })
}

fn run_alternating(config: &WorkloadConfig) -> Result<RunReport, DriverError> {
    let buffer = Arc::new(AlternatingBuffer::new(config.capacity));
    let token = CancelToken::new();

    let producers: Vec<_> = (0..config.producers)
        .map(|p| {
            let buffer = buffer.clone();
            let token = token.clone();
            let quota = config.quota;
            thread::spawn(move || {
                let mut done = 0;
                for i in 0..quota {
                    match buffer.put(item_id(p, i, quota), &token) {
                        Ok(()) => done += 1,
                        Err(WaitError::Cancelled) => {
                            warn!(producer = p, "put cancelled mid-wait");
                            break;
                        }
                    }
                }
                done
            })
        })
        .collect();

    let consumers: Vec<_> = (0..config.consumers)
        .map(|c| {
            let buffer = buffer.clone();
            let token = token.clone();
            let quota = config.quota;
            thread::spawn(move || {
                let mut done = 0;
                for _ in 0..quota {
                    match buffer.take(&token) {
                        Ok(_) => done += 1,
                        Err(WaitError::Cancelled) => {
                            warn!(consumer = c, "take cancelled mid-wait");
                            break;
                        }
                    }
                }
                done
            })
        })
        .collect();

    let produced = join_counts(producers)?;
    let consumed = join_counts(consumers)?;
    Ok(RunReport {
        produced,
        consumed,
        final_len: buffer.len(),
    })
}

fn run_sequenced(config: &WorkloadConfig) -> Result<RunReport, DriverError> {
    let buffer = Arc::new(SequencedBuffer::new(config.capacity));
    let token = CancelToken::new();

    let producers: Vec<_> = (0..config.producers)
        .map(|p| {
            let buffer = buffer.clone();
            let token = token.clone();
            let quota = config.quota;
            thread::spawn(move || {
                match buffer.produce_run(quota, |i| item_id(p, i, quota), &token) {
                    Ok(done) => done,
                    Err(cancelled) => {
                        warn!(
                            producer = p,
                            produced = cancelled.produced,
                            "produce run cancelled mid-wait"
                        );
                        cancelled.produced
                    }
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..config.consumers)
        .map(|c| {
            let buffer = buffer.clone();
            let token = token.clone();
            let quota = config.quota;
            thread::spawn(move || match buffer.consume_run(quota, &token) {
                Ok(taken) => taken.len(),
                Err(cancelled) => {
                    warn!(
                        consumer = c,
                        consumed = cancelled.taken.len(),
                        "consume run cancelled mid-wait"
                    );
                    cancelled.taken.len()
                }
            })
        })
        .collect();

    let produced = join_counts(producers)?;
    let consumed = join_counts(consumers)?;
    Ok(RunReport {
        produced,
        consumed,
        final_len: buffer.len(),
    })
}

fn join_counts(handles: Vec<JoinHandle<usize>>) -> Result<usize, DriverError> {
    let mut total = 0;
    for handle in handles {
        total += handle.join().map_err(|_| DriverError::WorkerPanicked)?;
    }
    Ok(total)
}
