// SPDX-License-Identifier: MIT

//! Multiplexer process utilities.
//!
//! The supervisor launches a task detached inside a named session so it
//! survives the supervisor thread exiting or being killed; completion is
//! then observed through the filesystem rather than a process handle
//! (§6). [`Tmux`] is the seam that lets tests run the whole attempt
//! algorithm without a real `tmux` binary on PATH.

use std::process::Command;

/// Operations the supervisor needs from a terminal multiplexer.
///
/// Abstracted behind a trait (rather than calling `std::process::Command`
/// directly from the supervisor) so tests can substitute a fake that
/// writes `done` files without actually spawning shells.
pub trait Tmux: Send + Sync {
    /// Start `cmd` detached in a new session named `session`, with
    /// `remain-on-exit` enabled so the pane is still capturable after the
    /// command exits.
    fn new_session(&self, session: &str, cmd: &str) -> Result<(), String>;

    /// Capture the session's pane output, scrollback included.
    fn capture_pane(&self, session: &str) -> Result<String, String>;

    /// Tear down a session. Idempotent: killing an already-dead or
    /// nonexistent session is not an error.
    fn kill_session(&self, session: &str);
}

/// Shells out to the real `tmux` binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTmux;

impl Tmux for RealTmux {
    fn new_session(&self, session: &str, cmd: &str) -> Result<(), String> {
        // A single chained invocation, not two sequential commands: `;` ties
        // `set remain-on-exit on` to the same tmux client call as
        // `new-session`, so the option lands before the pane can be torn
        // down. A fast-exiting `cmd` would otherwise kill its (only) pane —
        // and with it the session — before a second, separate `tmux`
        // process got a chance to set `remain-on-exit`.
        let status = Command::new("tmux")
            .args(["new-session", "-d", "-s", session, cmd, ";", "set", "remain-on-exit", "on"])
            .status()
            .map_err(|e| format!("failed to run tmux: {e}"))?;
        if !status.success() {
            return Err(format!("tmux new-session exited with {status}"));
        }
        Ok(())
    }

    fn capture_pane(&self, session: &str) -> Result<String, String> {
        let target = format!("{session}:0.0");
        let output = Command::new("tmux")
            .args(["capture-pane", "-pt", &target, "-S", "-10000"])
            .output()
            .map_err(|e| format!("failed to run tmux: {e}"))?;
        if !output.status.success() {
            return Err(format!("session not found: {session}"));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn kill_session(&self, session: &str) {
        let _ = Command::new("tmux").args(["kill-session", "-t", session]).status();
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
