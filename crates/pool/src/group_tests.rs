// SPDX-License-Identifier: MIT

use super::*;
use bernie_core::test_support::FakeTmux;
use bernie_core::Task;
use std::time::{Duration, Instant};

fn config() -> PoolConfig {
    PoolConfig {
        poll_initial: Duration::from_millis(5),
        poll_max: Duration::from_millis(20),
        ..PoolConfig::default()
    }
}

fn sh(name: &str, script: &str) -> Arc<Task> {
    Arc::new(Task::new(name, vec!["sh".to_string(), "-c".to_string(), script.to_string()], vec![], "/tmp"))
}

fn wait_until(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    predicate()
}

fn group() -> Group {
    Group::new("g1", sh("init", "true"), Arc::new(FakeTmux::new()), config())
}

#[test]
fn submit_rejects_a_duplicate_task_name() {
    let g = group();
    g.submit(vec![sh("t1", "true")]).expect("first submit");
    let err = g.submit(vec![sh("t1", "true")]).unwrap_err();
    assert!(matches!(err, GroupError::DuplicateTask(name) if name == "t1"));
}

#[test]
fn reset_tries_on_unknown_task_is_an_error() {
    let g = group();
    assert!(matches!(g.reset_tries("nope"), Err(GroupError::UnknownTask(_))));
}

#[test]
fn reset_failures_on_unknown_worker_is_an_error() {
    let g = group();
    assert!(matches!(g.reset_failures("nope"), Err(GroupError::UnknownWorker(_))));
}

#[test]
fn get_output_on_unknown_task_is_an_error() {
    let g = group();
    let tmux = FakeTmux::new();
    assert!(matches!(g.get_output("nope", &tmux), Err(GroupError::UnknownTask(_))));
}

#[test]
fn routes_submit_and_grow_by_name_through_to_the_pool() {
    let g = group();
    g.grow(vec![Worker::new("w1", "manifest")]);
    assert!(wait_until(Duration::from_secs(2), || g.worker_names().len() == 1));

    let task = sh("t1", "printf hi");
    g.submit(vec![Arc::clone(&task)]).expect("submit");
    assert!(wait_until(Duration::from_secs(2), || task.status().done));
    assert!(task.status().err.is_none());
}

#[test]
fn reset_failures_by_name_zeroes_the_counter() {
    let g = group();
    g.grow(vec![Worker::new("w1", "manifest")]);
    assert!(wait_until(Duration::from_secs(2), || g.worker_names().len() == 1));

    g.submit(vec![sh("t1", "false")]).expect("submit");
    assert!(wait_until(Duration::from_secs(2), || {
        g.pool().workers_copy().first().map(|w| w.status().failed_tasks > 0).unwrap_or(false)
    }));

    g.reset_failures("w1").expect("reset_failures");
    assert_eq!(g.pool().workers_copy()[0].status().failed_tasks, 0);
}

#[test]
fn remove_task_drops_it_from_the_registry_but_not_the_pool_state() {
    let g = group();
    g.submit(vec![sh("t1", "true")]).expect("submit");
    g.remove_task("t1").expect("remove_task");
    assert!(matches!(g.reset_tries("t1"), Err(GroupError::UnknownTask(_))));
    // Re-registering the same name is now allowed again.
    g.submit(vec![sh("t1", "true")]).expect("resubmit after remove");
}
