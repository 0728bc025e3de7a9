// SPDX-License-Identifier: MIT

//! The thin external container pairing one pool with a named, deduplicated
//! task registry (§4.6). Intentionally holds no scheduling logic of its
//! own — it exists so a surrounding server can route calls by name instead
//! of by reference.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use bernie_core::{Task, TaskName, Tmux, WorkerName};

use crate::config::PoolConfig;
use crate::worker::Worker;
use crate::WorkerPool;

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("task {0:?} already exists in this group")]
    DuplicateTask(String),
    #[error("no task named {0:?} in this group")]
    UnknownTask(String),
    #[error("no worker named {0:?} in this group's pool")]
    UnknownWorker(String),
}

pub struct Group {
    name: String,
    pool: Arc<WorkerPool>,
    tasks: Mutex<HashMap<TaskName, Arc<Task>>>,
}

impl Group {
    pub fn new(name: impl Into<String>, init_task: Arc<Task>, tmux: Arc<dyn Tmux>, config: PoolConfig) -> Self {
        Self {
            name: name.into(),
            pool: WorkerPool::new(init_task, tmux, config),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Register and submit new tasks. Rejects any name already present in
    /// this group (§3 "name unique within its group").
    pub fn submit(&self, tasks: Vec<Arc<Task>>) -> Result<(), GroupError> {
        {
            let mut registry = self.tasks.lock();
            for task in &tasks {
                if registry.contains_key(&task.name) {
                    return Err(GroupError::DuplicateTask(task.name.to_string()));
                }
            }
            for task in &tasks {
                registry.insert(task.name.clone(), Arc::clone(task));
            }
        }
        self.pool.submit(tasks);
        Ok(())
    }

    pub fn grow(&self, workers: Vec<Arc<Worker>>) {
        self.pool.grow(workers);
    }

    pub fn remove_workers<F>(&self, selector: F)
    where
        F: FnOnce(&[Arc<Worker>]) -> Vec<usize>,
    {
        self.pool.remove(selector);
    }

    pub fn reset_tries(&self, task: &str) -> Result<(), GroupError> {
        let registry = self.tasks.lock();
        let task = registry.get(task).ok_or_else(|| GroupError::UnknownTask(task.to_string()))?;
        task.reset_tries();
        Ok(())
    }

    pub fn reset_failures(&self, worker: &str) -> Result<(), GroupError> {
        let found = self
            .pool
            .workers_copy()
            .into_iter()
            .find(|w| w.name().as_str() == worker)
            .ok_or_else(|| GroupError::UnknownWorker(worker.to_string()))?;
        found.reset_failures();
        Ok(())
    }

    pub fn get_output(&self, task: &str, tmux: &dyn Tmux) -> Result<String, GroupError> {
        let registry = self.tasks.lock();
        let task = registry.get(task).ok_or_else(|| GroupError::UnknownTask(task.to_string()))?;
        Ok(task.get_output(tmux))
    }

    pub fn kill_task(&self, task: &str, tmux: &dyn Tmux) -> Result<(), GroupError> {
        let registry = self.tasks.lock();
        let task = registry.get(task).ok_or_else(|| GroupError::UnknownTask(task.to_string()))?;
        task.kill(tmux, false);
        Ok(())
    }

    pub fn remove_task(&self, task: &str) -> Result<(), GroupError> {
        let mut registry = self.tasks.lock();
        registry.remove(task).ok_or_else(|| GroupError::UnknownTask(task.to_string()))?;
        Ok(())
    }

    pub fn worker_names(&self) -> Vec<WorkerName> {
        self.pool.workers_copy().into_iter().map(|w| w.name().clone()).collect()
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
