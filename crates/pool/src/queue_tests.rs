// SPDX-License-Identifier: MIT

use super::*;

fn task(name: &str) -> Arc<Task> {
    Arc::new(Task::new(name, vec!["true".to_string()], vec![], "/tmp"))
}

#[test]
fn pops_in_fifo_order() {
    let mut q = TaskQueue::new();
    q.push_back(task("a"));
    q.push_back(task("b"));
    q.push_back(task("c"));
    assert_eq!(q.pop_front().unwrap().name.as_str(), "a");
    assert_eq!(q.pop_front().unwrap().name.as_str(), "b");
    assert_eq!(q.pop_front().unwrap().name.as_str(), "c");
    assert!(q.pop_front().is_none());
}

#[test]
fn allows_duplicate_entries_for_the_same_task() {
    let mut q = TaskQueue::new();
    let t = task("a");
    q.push_back(Arc::clone(&t));
    q.push_back(Arc::clone(&t));
    assert_eq!(q.len(), 2);
}

#[test]
fn empty_queue_reports_empty() {
    let q = TaskQueue::new();
    assert!(q.is_empty());
}
