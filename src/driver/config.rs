/*!
 * Workload Configuration
 *
 * Hard-coded defaults with environment overrides
 */

use std::env;
use tracing::warn;

/// Task counts and buffer sizing for one exercise run.
///
/// Defaults mirror the classic exercise constants: two producers and two
/// consumers, nine operations each, capacity ten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Number of producer tasks to spawn
    pub producers: usize,
    /// Number of consumer tasks to spawn
    pub consumers: usize,
    /// Operations performed by each task
    pub quota: usize,
    /// Buffer capacity (ignored by the unbounded stack)
    pub capacity: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            producers: 2,
            consumers: 2,
            quota: 9,
            capacity: 10,
        }
    }
}

impl WorkloadConfig {
    /// Build a config from `TURNWISE_PRODUCERS`, `TURNWISE_CONSUMERS`,
    /// `TURNWISE_QUOTA` and `TURNWISE_CAPACITY`, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            producers: env_usize("TURNWISE_PRODUCERS", defaults.producers),
            consumers: env_usize("TURNWISE_CONSUMERS", defaults.consumers),
            quota: env_usize("TURNWISE_QUOTA", defaults.quota),
            capacity: env_usize("TURNWISE_CAPACITY", defaults.capacity),
        }
    }

    /// Total puts a balanced run performs.
    pub fn total_produced(&self) -> usize {
        self.producers * self.quota
    }

    /// Total takes a balanced run performs.
    pub fn total_consumed(&self) -> usize {
        self.consumers * self.quota
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, raw = %raw, "ignoring unparsable override");
                default
            }
        },
        Err(_) => default,
    }
}
