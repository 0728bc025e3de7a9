// SPDX-License-Identifier: MIT

//! Pool-wide tunables.
//!
//! Expressed as constructor parameters with a `Default` impl rather than
//! environment-variable lookups (the way the teacher's `env.rs` centralizes
//! knobs) — the pool itself has no ambient environment to read; that
//! belongs to the HTTP boundary this crate doesn't implement.

use std::time::Duration;

/// Tunables shared by every worker and attempt supervisor in a pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    /// A task is permanently abandoned once `tries` exceeds this.
    pub max_task_tries: u32,
    /// A worker is dropped from the free set once `failed_tasks` exceeds this.
    pub max_worker_failures: u32,
    /// Initial delay of the completion-poll backoff.
    pub poll_initial: Duration,
    /// Ceiling the completion-poll backoff saturates at.
    pub poll_max: Duration,
    /// Bound on how long a worker teardown may take before `Remove`/`Kill`
    /// gives up waiting on it.
    pub kill_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_task_tries: 4,
            max_worker_failures: 3,
            poll_initial: Duration::from_millis(125),
            poll_max: Duration::from_secs(10),
            kill_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
