// SPDX-License-Identifier: MIT

//! Task value type and status state machine.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TaskError;
use crate::tmux::Tmux;

/// A task's name, unique within its owning group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskName(pub String);

impl TaskName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for TaskName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for TaskName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The worker's name, used here only to record who is running a task —
/// a plain handle, not an owning reference, so task and worker never hold
/// each other alive (§9 design note: string handles, not reciprocal `Arc`).
use crate::worker::WorkerName;

/// Mutable status of a single task. Every mutation is a whole-record
/// replacement performed under [`Task::status`]'s lock.
#[derive(Debug, Clone, Default)]
pub struct TaskStatus {
    pub tries: u32,
    pub done: bool,
    pub killed: bool,
    pub err: Option<TaskError>,
    pub runner: Option<WorkerName>,
    pub session_id: String,
}

impl TaskStatus {
    /// `IsNew`: never attempted and free of any recorded error.
    pub fn is_new(&self) -> bool {
        self.err.is_none() && self.tries == 0
    }

    /// `IsRunning`: actively owned by a worker, neither killed nor finished.
    pub fn is_running(&self) -> bool {
        self.err.is_none() && !self.killed && !self.done && self.runner.is_some()
    }

    /// User-facing label, per the §7 table. `worker_label` supplies the
    /// "{worker}" fill-in for the Ran-on/Running-on rows, since `runner`
    /// only stores a name, not a live handle to ask for a display form.
    pub fn human_friendly(&self, max_tries: u32) -> String {
        if self.done && self.err.is_none() {
            let worker = self.runner.as_ref().map(|w| w.as_str()).unwrap_or("?");
            return format!("Ran on {worker}");
        }
        if self.done {
            if let Some(err) = &self.err {
                return format!("Got err: {err}, {} fails", self.tries);
            }
        }
        if self.runner.is_some() && !self.done {
            let worker = self.runner.as_ref().map(|w| w.as_str()).unwrap_or("?");
            return format!("Running on {worker}");
        }
        if self.tries > max_tries {
            return "Too many failed tries".to_string();
        }
        if self.killed {
            return "Killed".to_string();
        }
        format!("Queued, {} fails", self.tries)
    }
}

crate::builder! {
    pub struct TaskStatusBuilder => TaskStatus {
        set {
            tries: u32 = 0,
            done: bool = false,
            killed: bool = false,
        }
        option {
            err: TaskError = None,
            runner: WorkerName = None,
        }
        into {
            session_id: String = "",
        }
    }
}

/// One shell command plus its mutable execution status.
#[derive(Debug)]
pub struct Task {
    pub name: TaskName,
    pub cmd: Vec<String>,
    pub env: Vec<String>,
    pub wd: String,
    status: Mutex<TaskStatus>,
}

impl Task {
    pub fn new(name: impl Into<TaskName>, cmd: Vec<String>, env: Vec<String>, wd: impl Into<String>) -> Self {
        Self { name: name.into(), cmd, env, wd: wd.into(), status: Mutex::new(TaskStatus::default()) }
    }

    /// A new task sharing this one's immutable fields with a zeroed status.
    /// The pool hands a fresh copy to each worker for its own init attempt.
    pub fn fresh_copy(&self) -> Arc<Task> {
        Arc::new(Task::new(self.name.clone(), self.cmd.clone(), self.env.clone(), self.wd.clone()))
    }

    pub fn status(&self) -> TaskStatus {
        self.status.lock().clone()
    }

    pub fn set_status(&self, status: TaskStatus) {
        *self.status.lock() = status;
    }

    pub fn reset_tries(&self) {
        self.status.lock().tries = 0;
    }

    /// Cancel this task. If `worker_killed`, the owning worker was torn
    /// down — record `WorkerKilled` and leave `killed` false, since the
    /// task itself wasn't the target and is eligible to run again. Otherwise
    /// this is an operator cancellation: record `TaskKilled` and set
    /// `killed=true` permanently.
    pub fn kill(&self, tmux: &dyn Tmux, worker_killed: bool) {
        tracing::info!(task = %self.name, worker_killed, "killing task");
        let session = {
            let mut status = self.status.lock();
            if worker_killed {
                status.err = Some(TaskError::WorkerKilled);
            } else {
                status.err = Some(TaskError::TaskKilled);
                status.killed = true;
            }
            status.session_id.clone()
        };
        if !session.is_empty() {
            tmux.kill_session(&session);
        }
    }

    /// Tear down a lingering multiplexer session ahead of a clean retry,
    /// without marking the task killed (§9 decision 4 — distinct from
    /// [`Task::kill`], which is reserved for cancellation).
    pub fn clear_session_for_retry(&self, tmux: &dyn Tmux) {
        let session = {
            let mut status = self.status.lock();
            std::mem::take(&mut status.session_id)
        };
        if !session.is_empty() {
            tmux.kill_session(&session);
        }
    }

    /// Captured pane output for this task's most recent session, or empty
    /// if none has been launched yet.
    pub fn get_output(&self, tmux: &dyn Tmux) -> String {
        let session = self.status.lock().session_id.clone();
        if session.is_empty() {
            return String::new();
        }
        tmux.capture_pane(&session).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
