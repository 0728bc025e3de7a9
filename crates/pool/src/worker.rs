// SPDX-License-Identifier: MIT

//! The behavioral worker: a named execution slot that serializes its own
//! initialization and hosts the attempt supervisor for whatever task it's
//! currently running.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use bernie_core::{SessionNamer, Task, TaskName, Tmux, WorkerName, WorkerState, WorkerStatus};

use crate::config::PoolConfig;
use crate::supervisor;

/// Result of one [`Worker::run`] call, surfaced to the pool's scheduler.
pub enum RunOutcome {
    /// The worker was already busy or killed; the scheduler should try a
    /// different worker and leave the task queued for that.
    NotDispatched,
    /// The attempt ran to completion (whatever its outcome). The task's own
    /// status record carries the result.
    Ran,
}

/// A named execution slot. Holds the pure [`WorkerStatus`] from
/// `bernie-core` plus a live handle to whatever task it's currently
/// running, so [`Worker::kill`] can reach into that task and cancel it —
/// the status record itself only ever stores the task's *name* (§9 design
/// note: string handles, not reciprocal ownership).
pub struct Worker {
    name: WorkerName,
    manifest: String,
    status: Mutex<WorkerStatus>,
    current_task: Mutex<Option<Arc<Task>>>,
    init_lock: Mutex<()>,
}

impl Worker {
    pub fn new(name: impl Into<WorkerName>, manifest: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            manifest: manifest.into(),
            status: Mutex::new(WorkerStatus::default()),
            current_task: Mutex::new(None),
            init_lock: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &WorkerName {
        &self.name
    }

    pub fn manifest(&self) -> &str {
        &self.manifest
    }

    pub fn status(&self) -> WorkerStatus {
        self.status.lock().clone()
    }

    pub fn state(&self, config: &PoolConfig) -> WorkerState {
        self.status.lock().state(config.max_worker_failures)
    }

    pub fn is_eligible_free(&self, config: &PoolConfig) -> bool {
        self.status.lock().is_eligible_free(config.max_worker_failures)
    }

    pub fn reset_failures(&self) {
        self.status.lock().failed_tasks = 0;
    }

    /// Idempotent: a worker that's already initialized returns immediately.
    /// Concurrent callers are serialized through `init_lock` so the second
    /// one observes the first attempt's outcome instead of racing it.
    pub fn init(
        &self,
        init_task: Arc<Task>,
        tmux: &dyn Tmux,
        config: &PoolConfig,
        session_namer: &SessionNamer,
    ) -> bool {
        let _guard = self.init_lock.lock();
        if self.status.lock().initialized {
            return true;
        }
        self.do_init(init_task, tmux, config, session_namer)
    }

    /// Unconditionally resets failure state and re-runs initialization.
    pub fn reinit(
        &self,
        init_task: Arc<Task>,
        tmux: &dyn Tmux,
        config: &PoolConfig,
        session_namer: &SessionNamer,
    ) -> bool {
        let _guard = self.init_lock.lock();
        {
            let mut status = self.status.lock();
            status.failed_tasks = 0;
            status.initialized = false;
        }
        self.do_init(init_task, tmux, config, session_namer)
    }

    /// Runs `init_task` as if it were a regular task (§4.3 `Init`) — same
    /// `run` path, same `failed_tasks` accounting on a bad attempt.
    fn do_init(
        &self,
        init_task: Arc<Task>,
        tmux: &dyn Tmux,
        config: &PoolConfig,
        session_namer: &SessionNamer,
    ) -> bool {
        self.status.lock().init_task = Some(init_task.name.clone());
        self.run(Arc::clone(&init_task), tmux, config, session_namer);
        let initialized = init_task.status().err.is_none();
        self.status.lock().initialized = initialized;
        initialized
    }

    /// §4.2 — run the task supervisor for one attempt on this worker.
    ///
    /// Performs the worker-level guard (§4.2a: already running, or killed)
    /// under the worker lock, *before* the supervisor touches the task at
    /// all (§9 decision 3) — a failed guard never increments `tries`.
    pub fn run(
        &self,
        task: Arc<Task>,
        tmux: &dyn Tmux,
        config: &PoolConfig,
        session_namer: &SessionNamer,
    ) -> RunOutcome {
        {
            let status = self.status.lock();
            if status.running_task.is_some() {
                return RunOutcome::NotDispatched;
            }
            if status.killed {
                dispatched_to_killed_worker(&self.name);
            }
        }

        tracing::debug!(worker = %self.name, task = %task.name, "attempt started");
        let outcome = self.run_attempt_unguarded(&task, tmux, config, session_namer);

        let mut status = self.status.lock();
        status.running_task = None;
        if outcome.as_ref().is_some_and(|err| !err.is_task_killed()) {
            status.failed_tasks += 1;
        }
        let failed_tasks = status.failed_tasks;
        drop(status);
        *self.current_task.lock() = None;

        match &outcome {
            None => tracing::info!(worker = %self.name, task = %task.name, "attempt succeeded"),
            Some(err) => tracing::warn!(worker = %self.name, task = %task.name, failed_tasks, error = %err, "attempt failed"),
        }

        RunOutcome::Ran
    }

    fn run_attempt_unguarded(
        &self,
        task: &Arc<Task>,
        tmux: &dyn Tmux,
        config: &PoolConfig,
        session_namer: &SessionNamer,
    ) -> supervisor::AttemptOutcome {
        self.status.lock().running_task = Some(task.name.clone());
        *self.current_task.lock() = Some(Arc::clone(task));

        supervisor::run_attempt(task, &self.name, &self.manifest, tmux, config, session_namer)
    }

    /// Mark this worker killed; if it's currently running a task, cancel
    /// that task as a worker-initiated kill (§4.3). The cancellation itself
    /// (which shells out to `tmux kill-session`) runs on its own thread so
    /// that `timeout` genuinely bounds how long this call can block: if the
    /// multiplexer teardown hasn't reported back within `timeout`, this
    /// returns anyway and the teardown finishes in the background.
    pub fn kill(&self, tmux: Arc<dyn Tmux>, timeout: Duration) {
        tracing::info!(worker = %self.name, "killing worker");
        self.status.lock().killed = true;
        let Some(task) = self.current_task.lock().clone() else { return };

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            task.kill(tmux.as_ref(), true);
            let _ = done_tx.send(());
        });
        if done_rx.recv_timeout(timeout).is_err() {
            tracing::warn!(worker = %self.name, timeout_ms = timeout.as_millis() as u64, "worker teardown still running past kill_timeout");
        }
    }

    pub fn running_task_name(&self) -> Option<TaskName> {
        self.status.lock().running_task.clone()
    }
}

/// The scheduler must never dispatch to a killed worker; reaching this is a
/// programmer error in the caller, not a runtime condition to recover from.
#[allow(clippy::panic)]
fn dispatched_to_killed_worker(worker: &WorkerName) -> ! {
    panic!("dispatch to killed worker {worker}");
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
