// SPDX-License-Identifier: MIT

use super::*;

// These exercise the real `tmux` binary and are skipped by default; they're
// here for anyone running the suite on a box with tmux installed.

#[test]
#[ignore = "requires a real tmux binary on PATH"]
fn capture_pane_on_missing_session_is_an_error() {
    let tmux = RealTmux;
    let result = tmux.capture_pane("bernie-task+nonexistent-session");
    assert!(result.is_err());
}

#[test]
#[ignore = "requires a real tmux binary on PATH"]
fn kill_session_on_missing_session_does_not_panic() {
    let tmux = RealTmux;
    tmux.kill_session("bernie-task+nonexistent-session");
}

#[test]
#[ignore = "requires a real tmux binary on PATH"]
fn round_trips_a_session() {
    let tmux = RealTmux;
    let session = "bernie-task+tmux-smoke-test";
    tmux.new_session(session, "echo hello").expect("new_session");
    std::thread::sleep(std::time::Duration::from_millis(200));
    let pane = tmux.capture_pane(session).expect("capture_pane");
    assert!(pane.contains("hello"));
    tmux.kill_session(session);
}
