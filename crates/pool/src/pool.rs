// SPDX-License-Identifier: MIT

//! The worker pool: queue, roster, free set, and the scheduling rule that
//! pairs them (§4.5).

use std::sync::Arc;

use parking_lot::Mutex;

use bernie_core::{SessionNamer, Task, TaskError, Tmux};

use crate::config::PoolConfig;
use crate::queue::TaskQueue;
use crate::worker::{RunOutcome, Worker};

struct PoolState {
    queued: TaskQueue,
    roster: Vec<Arc<Worker>>,
    free: Vec<Arc<Worker>>,
    init_task: Arc<Task>,
}

/// Owns the queue, the full worker roster, and the free-workers set; pairs
/// them via the scheduling rule. All four live under one lock (§5 "pool.mu"
/// protects `queued`, `pool`, `free`, `init_task`).
pub struct WorkerPool {
    state: Mutex<PoolState>,
    config: PoolConfig,
    tmux: Arc<dyn Tmux>,
    session_namer: SessionNamer,
}

impl WorkerPool {
    pub fn new(init_task: Arc<Task>, tmux: Arc<dyn Tmux>, config: PoolConfig) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PoolState {
                queued: TaskQueue::new(),
                roster: Vec::new(),
                free: Vec::new(),
                init_task,
            }),
            config,
            tmux,
            session_namer: SessionNamer::new(),
        })
    }

    pub fn allowable_task_tries(&self) -> u32 {
        self.config.max_task_tries
    }

    pub fn allowable_worker_failures(&self) -> u32 {
        self.config.max_worker_failures
    }

    pub fn workers_copy(&self) -> Vec<Arc<Worker>> {
        self.state.lock().roster.clone()
    }

    /// Append each task to the queue, then run the scheduling step. Always
    /// succeeds.
    pub fn submit(self: &Arc<Self>, tasks: Vec<Arc<Task>>) {
        {
            let mut state = self.state.lock();
            for task in tasks {
                tracing::debug!(task = %task.name, "task submitted");
                state.queued.push_back(task);
            }
        }
        self.schedule();
    }

    /// Append `workers` to the roster; for each, spawn an asynchronous
    /// initializer that retries `Init` up to `max_worker_failures + 1`
    /// times and, on success, adds it to the free set and reschedules.
    pub fn grow(self: &Arc<Self>, workers: Vec<Arc<Worker>>) {
        for worker in workers {
            self.state.lock().roster.push(Arc::clone(&worker));
            let pool = Arc::clone(self);
            std::thread::spawn(move || pool.initialize_then_free(worker));
        }
    }

    fn initialize_then_free(self: Arc<Self>, worker: Arc<Worker>) {
        let init_task_template = Arc::clone(&self.state.lock().init_task);
        let max_attempts = self.config.max_worker_failures + 1;

        let mut initialized = false;
        for _ in 0..max_attempts {
            let fresh = init_task_template.fresh_copy();
            if worker.init(fresh, self.tmux.as_ref(), &self.config, &self.session_namer) {
                initialized = true;
                break;
            }
        }

        if !initialized {
            tracing::warn!(worker = %worker.name(), "worker failed to initialize after exhausting retries");
            return;
        }

        tracing::info!(worker = %worker.name(), "worker initialized");
        {
            let mut state = self.state.lock();
            state.free.push(worker);
        }
        self.schedule();
    }

    /// `selector` receives the current roster slice and returns the
    /// indices to remove. Those workers are killed in parallel; each kill
    /// is bounded by `config.kill_timeout` (`Worker::kill` itself returns
    /// once that elapses even if the underlying `tmux` teardown hasn't
    /// finished), so this whole call returns within roughly `kill_timeout`
    /// regardless of how many victims there are. The victims are then
    /// dropped from both the roster and the free set, and the scheduler
    /// runs again.
    pub fn remove<F>(self: &Arc<Self>, selector: F)
    where
        F: FnOnce(&[Arc<Worker>]) -> Vec<usize>,
    {
        let victims: Vec<Arc<Worker>> = {
            let state = self.state.lock();
            let indices = selector(&state.roster);
            indices.iter().filter_map(|&i| state.roster.get(i).cloned()).collect()
        };
        if victims.is_empty() {
            return;
        }
        tracing::info!(count = victims.len(), "removing workers from pool");

        let timeout = self.config.kill_timeout;
        let handles: Vec<_> = victims
            .iter()
            .cloned()
            .map(|worker| {
                let tmux = Arc::clone(&self.tmux);
                std::thread::spawn(move || worker.kill(tmux, timeout))
            })
            .collect();
        for handle in handles {
            let _ = handle.join();
        }

        {
            let mut state = self.state.lock();
            let victim_names: Vec<_> = victims.iter().map(|w| w.name().clone()).collect();
            state.roster.retain(|w| !victim_names.contains(w.name()));
            state.free.retain(|w| !victim_names.contains(w.name()));
        }
        self.schedule();
    }

    /// While the queue is non-empty and a free worker is available, pair
    /// the head of the queue with the most-recently-freed worker and run
    /// its attempt on a dedicated thread.
    fn schedule(self: &Arc<Self>) {
        loop {
            let (task, worker) = {
                let mut state = self.state.lock();
                if state.queued.is_empty() || state.free.is_empty() {
                    return;
                }
                let Some(task) = state.queued.pop_front() else { return };
                if task.status().is_running() || task.status().killed {
                    // Stale re-queue or cancellation: drop this entry and
                    // keep scanning the rest of the queue this round.
                    continue;
                }
                let Some(worker) = state.free.pop() else {
                    // No free worker after all (shouldn't happen under the
                    // lock, but stay defensive); put the task back.
                    state.queued.push_back(task);
                    return;
                };
                (task, worker)
            };

            tracing::debug!(task = %task.name, worker = %worker.name(), "task dispatched");
            let pool = Arc::clone(self);
            std::thread::spawn(move || pool.run_and_reschedule(worker, task));
        }
    }

    fn run_and_reschedule(self: Arc<Self>, worker: Arc<Worker>, task: Arc<Task>) {
        let outcome = worker.run(Arc::clone(&task), self.tmux.as_ref(), &self.config, &self.session_namer);

        if matches!(outcome, RunOutcome::NotDispatched) {
            // Lost the race to another caller; the task was never touched
            // (tries not incremented), so just put it back on the queue.
            self.state.lock().queued.push_back(task);
            self.schedule();
            return;
        }

        {
            let mut state = self.state.lock();
            if worker.is_eligible_free(&self.config) {
                state.free.push(Arc::clone(&worker));
            }
        }
        self.schedule();

        let status = task.status();
        if let Some(err) = &status.err {
            if status.tries < self.config.max_task_tries && !status.killed {
                if !err.is_worker_killed() {
                    task.clear_session_for_retry(self.tmux.as_ref());
                }
                tracing::info!(task = %task.name, tries = status.tries, error = %err, "retrying task");
                self.submit(vec![task]);
            } else {
                tracing::warn!(task = %task.name, tries = status.tries, error = %err, "task exhausted retries or was cancelled");
            }
        }
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
