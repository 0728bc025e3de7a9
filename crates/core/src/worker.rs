// SPDX-License-Identifier: MIT

//! Worker value type and its human-friendly state machine.
//!
//! This module defines [`WorkerName`], [`WorkerStatus`] and [`WorkerState`]
//! only — the pure data side of a worker. The behavioral side (init/run/kill
//! and the attempt supervisor) lives in `bernie-pool`, which is the only
//! crate that knows about scheduling policy.

use std::borrow::Borrow;
use std::fmt;

use crate::task::TaskName;

/// A worker's name, unique within its pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerName(pub String);

impl WorkerName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for WorkerName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkerName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for WorkerName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WorkerName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for WorkerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Human-friendly label for a worker, independent of any task it may be
/// running. Distinct from a task's §7 label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created,
    Initializing,
    Ready,
    Busy,
    Dead,
    Killed,
}

crate::simple_display! {
    WorkerState {
        Created => "Created",
        Initializing => "Initializing",
        Ready => "Ready",
        Busy => "Busy",
        Dead => "Dead",
        Killed => "Killed",
    }
}

/// Mutable status of a single worker. Every mutation happens under the
/// pool/worker's status lock (owned by `bernie-pool`'s `Worker`).
#[derive(Debug, Clone, Default)]
pub struct WorkerStatus {
    pub initialized: bool,
    pub failed_tasks: u32,
    pub running_task: Option<TaskName>,
    pub init_task: Option<TaskName>,
    pub killed: bool,
}

impl WorkerStatus {
    /// Eligible for the free set per the §3 invariant, parameterized by
    /// the pool's configured failure cap.
    pub fn is_eligible_free(&self, max_worker_failures: u32) -> bool {
        self.running_task.is_none()
            && self.initialized
            && !self.killed
            && self.failed_tasks < max_worker_failures
    }

    /// Whether this worker has exceeded its failure budget (§4.3 "Dead").
    pub fn is_dead(&self, max_worker_failures: u32) -> bool {
        self.failed_tasks > max_worker_failures
    }

    /// Current label per the §4.3 state table.
    pub fn state(&self, max_worker_failures: u32) -> WorkerState {
        if self.killed {
            return WorkerState::Killed;
        }
        if self.is_dead(max_worker_failures) {
            return WorkerState::Dead;
        }
        if self.running_task.is_some() {
            return WorkerState::Busy;
        }
        if self.initialized {
            return WorkerState::Ready;
        }
        if self.init_task.is_some() {
            return WorkerState::Initializing;
        }
        WorkerState::Created
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
