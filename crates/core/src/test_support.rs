// SPDX-License-Identifier: MIT

//! Test doubles shared by this crate's own tests and downstream crates
//! (gated behind `test-support` so `bernie-pool` can depend on them too).

#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::io::Read as _;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::tmux::Tmux;

struct FakeSession {
    child: Child,
    output: Arc<Mutex<Vec<u8>>>,
}

/// An in-process stand-in for a real multiplexer.
///
/// Runs `cmd` through `sh -c` directly rather than inside an actual
/// terminal-multiplexer session, so supervisor/pool tests exercise the real
/// generated `do.sh` script (and its `done`-file side effect) in
/// milliseconds without `tmux` on the test host (§8 "Test tooling").
#[derive(Default)]
pub struct FakeTmux {
    sessions: Mutex<HashMap<String, FakeSession>>,
}

impl FakeTmux {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()) }
    }
}

impl Tmux for FakeTmux {
    fn new_session(&self, session: &str, cmd: &str) -> Result<(), String> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to spawn fake session: {e}"))?;

        let output = Arc::new(Mutex::new(Vec::new()));

        if let Some(mut s) = child.stdout.take() {
            let out_buf = Arc::clone(&output);
            std::thread::spawn(move || {
                let mut buf = [0u8; 4096];
                while let Ok(n) = s.read(&mut buf) {
                    if n == 0 {
                        break;
                    }
                    out_buf.lock().extend_from_slice(&buf[..n]);
                }
            });
        }
        if let Some(mut s) = child.stderr.take() {
            let out_buf = Arc::clone(&output);
            std::thread::spawn(move || {
                let mut buf = [0u8; 4096];
                while let Ok(n) = s.read(&mut buf) {
                    if n == 0 {
                        break;
                    }
                    out_buf.lock().extend_from_slice(&buf[..n]);
                }
            });
        }

        self.sessions.lock().insert(session.to_string(), FakeSession { child, output });
        Ok(())
    }

    fn capture_pane(&self, session: &str) -> Result<String, String> {
        let sessions = self.sessions.lock();
        let session = sessions.get(session).ok_or_else(|| format!("session not found: {session}"))?;
        Ok(String::from_utf8_lossy(&session.output.lock()).to_string())
    }

    fn kill_session(&self, session: &str) {
        if let Some(mut s) = self.sessions.lock().remove(session) {
            let _ = s.child.kill();
            let _ = s.child.wait();
        }
    }
}

impl Drop for FakeTmux {
    fn drop(&mut self) {
        for (_, mut session) in self.sessions.lock().drain() {
            let _ = session.child.kill();
        }
    }
}

/// Blocks until `path` exists or the timeout elapses. Tests poll for the
/// `done` file exactly as the real supervisor does, just with a shorter
/// ceiling.
pub fn wait_for_path(path: &std::path::Path, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if path.exists() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    path.exists()
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
