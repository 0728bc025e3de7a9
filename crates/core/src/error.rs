// SPDX-License-Identifier: MIT

//! Error kinds that flow through a task's status record.

use thiserror::Error;

/// All outcomes an attempt can record against a task.
///
/// `Clone` because a single outcome is read by many observers (the pool's
/// retry decision, the HTTP boundary's status poll, tests) without
/// re-running the attempt; `PartialEq` so tests can assert on outcome shape
/// without string-matching `Display` output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Filesystem failure while staging the attempt's temp directory.
    #[error("setup failed: {0}")]
    Setup(String),

    /// The multiplexer refused to start the detached session.
    #[error("failed to launch: {0}")]
    Launch(String),

    /// The child exited with a non-zero status, parsed from the `done` file.
    #[error("exit status {0}")]
    ExitStatus(i32),

    /// The `done` file existed but its contents could not be read or parsed.
    #[error("unable to read completion status: {0}")]
    MalformedDone(String),

    /// Operator-initiated cancellation of the task itself.
    #[error("task was killed")]
    TaskKilled,

    /// The worker running this attempt was torn down mid-run.
    #[error("worker was killed")]
    WorkerKilled,
}

impl TaskError {
    /// True for the one outcome that must never count against
    /// `failed_tasks` or leave the task in a terminal state on its own
    /// (the pool re-queues it).
    pub fn is_task_killed(&self) -> bool {
        matches!(self, TaskError::TaskKilled)
    }

    /// True when the worker, not the task, was the target of cancellation.
    /// Attempts ending this way roll `tries` back by one (§4.2d).
    pub fn is_worker_killed(&self) -> bool {
        matches!(self, TaskError::WorkerKilled)
    }
}
