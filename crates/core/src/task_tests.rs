// SPDX-License-Identifier: MIT

use super::*;
use proptest::prelude::*;

struct FakeTmux {
    killed: Mutex<Vec<String>>,
    pane: String,
}

impl FakeTmux {
    fn new(pane: &str) -> Self {
        Self { killed: Mutex::new(Vec::new()), pane: pane.to_string() }
    }
}

impl Tmux for FakeTmux {
    fn new_session(&self, _session: &str, _cmd: &str) -> Result<(), String> {
        Ok(())
    }

    fn capture_pane(&self, _session: &str) -> Result<String, String> {
        Ok(self.pane.clone())
    }

    fn kill_session(&self, session: &str) {
        self.killed.lock().push(session.to_string());
    }
}

fn task(name: &str) -> Task {
    Task::new(name, vec!["true".to_string()], vec![], "/tmp")
}

#[test]
fn fresh_task_is_new() {
    let t = task("a");
    assert!(t.status().is_new());
    assert!(!t.status().is_running());
}

#[test]
fn fresh_copy_shares_immutable_fields_with_zeroed_status() {
    let t = task("a");
    t.set_status(TaskStatus { tries: 3, done: true, ..Default::default() });
    let copy = t.fresh_copy();
    assert_eq!(copy.name, t.name);
    assert_eq!(copy.cmd, t.cmd);
    assert!(copy.status().is_new());
}

#[test]
fn kill_by_operator_sets_killed_and_task_killed_error() {
    let t = task("a");
    t.set_status(TaskStatus { session_id: "bernie-task+x".to_string(), ..Default::default() });
    let tmux = FakeTmux::new("");
    t.kill(&tmux, false);
    let status = t.status();
    assert!(status.killed);
    assert_eq!(status.err, Some(TaskError::TaskKilled));
    assert_eq!(tmux.killed.lock().as_slice(), ["bernie-task+x".to_string()]);
}

#[test]
fn kill_by_worker_teardown_does_not_set_killed() {
    let t = task("a");
    t.set_status(TaskStatus { session_id: "bernie-task+x".to_string(), ..Default::default() });
    let tmux = FakeTmux::new("");
    t.kill(&tmux, true);
    let status = t.status();
    assert!(!status.killed, "worker-initiated kill must not mark the task killed");
    assert_eq!(status.err, Some(TaskError::WorkerKilled));
}

#[test]
fn kill_without_a_session_does_not_shell_out() {
    let t = task("a");
    let tmux = FakeTmux::new("");
    t.kill(&tmux, false);
    assert!(tmux.killed.lock().is_empty());
}

#[test]
fn clear_session_for_retry_never_marks_killed() {
    let t = task("a");
    t.set_status(TaskStatus { session_id: "bernie-task+x".to_string(), tries: 1, ..Default::default() });
    let tmux = FakeTmux::new("");
    t.clear_session_for_retry(&tmux);
    let status = t.status();
    assert!(!status.killed);
    assert!(status.err.is_none());
    assert_eq!(status.session_id, "");
    assert_eq!(tmux.killed.lock().as_slice(), ["bernie-task+x".to_string()]);
}

#[test]
fn get_output_is_empty_with_no_session() {
    let t = task("a");
    let tmux = FakeTmux::new("should not be seen");
    assert_eq!(t.get_output(&tmux), "");
}

#[test]
fn get_output_captures_the_recorded_session() {
    let t = task("a");
    t.set_status(TaskStatus { session_id: "bernie-task+x".to_string(), ..Default::default() });
    let tmux = FakeTmux::new("hello\n");
    assert_eq!(t.get_output(&tmux), "hello\n");
}

#[test]
fn reset_tries_zeroes_the_counter_only() {
    let t = task("a");
    t.set_status(TaskStatus { tries: 4, done: true, err: Some(TaskError::ExitStatus(1)), ..Default::default() });
    t.reset_tries();
    let status = t.status();
    assert_eq!(status.tries, 0);
    assert!(status.done, "reset_tries must not touch unrelated fields");
}

#[yare::parameterized(
    queued = { TaskStatus::default(), "Queued, 0 fails" },
    running = { TaskStatus::builder().runner("w1").build(), "Running on w1" },
    ran = { TaskStatus::builder().done(true).runner("w1").build(), "Ran on w1" },
    errored = { TaskStatus::builder().done(true).err(TaskError::ExitStatus(1)).tries(2).build(), "Got err: exit status 1, 2 fails" },
    exhausted = { TaskStatus::builder().tries(5).build(), "Too many failed tries" },
    killed = { TaskStatus::builder().killed(true).build(), "Killed" },
)]
fn human_friendly_labels_match_the_table(status: TaskStatus, expected: &str) {
    assert_eq!(status.human_friendly(4), expected);
}

proptest! {
    /// §8 "Determinism of labels": for any status record, `human_friendly`
    /// returns exactly the label the §7 priority table picks, independent
    /// of the handful of fixed examples above.
    #[test]
    fn human_friendly_always_matches_the_priority_table(
        done in proptest::bool::ANY,
        killed in proptest::bool::ANY,
        has_runner in proptest::bool::ANY,
        has_err in proptest::bool::ANY,
        tries in 0u32..10,
        max_tries in 0u32..10,
    ) {
        let mut status = TaskStatus::builder().tries(tries).done(done).killed(killed).build();
        if has_runner {
            status.runner = Some(crate::worker::WorkerName::new("w1"));
        }
        if has_err {
            status.err = Some(TaskError::ExitStatus(1));
        }
        let runner_label = status.runner.as_ref().map(|w| w.as_str()).unwrap_or("?");

        let expected = if done && status.err.is_none() {
            format!("Ran on {runner_label}")
        } else if done {
            format!("Got err: {}, {tries} fails", status.err.as_ref().expect("checked above"))
        } else if has_runner {
            format!("Running on {runner_label}")
        } else if tries > max_tries {
            "Too many failed tries".to_string()
        } else if killed {
            "Killed".to_string()
        } else {
            format!("Queued, {tries} fails")
        };

        prop_assert_eq!(status.human_friendly(max_tries), expected);
    }
}
