// SPDX-License-Identifier: MIT

//! FIFO of tasks awaiting a worker.

use std::collections::VecDeque;
use std::sync::Arc;

use bernie_core::Task;

/// Append-to-tail, pop-from-head queue of tasks. Membership is not
/// deduplicated — a task resubmitted after failure is pushed again; the
/// scheduler relies on the task's own `IsRunning`/`killed` status to skip
/// stale entries at pop time (§3 "Queue").
#[derive(Default)]
pub struct TaskQueue {
    tasks: VecDeque<Arc<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self { tasks: VecDeque::new() }
    }

    pub fn push_back(&mut self, task: Arc<Task>) {
        self.tasks.push_back(task);
    }

    pub fn pop_front(&mut self) -> Option<Arc<Task>> {
        self.tasks.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
