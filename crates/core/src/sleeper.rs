// SPDX-License-Identifier: MIT

//! Exponential backoff for polling a task's `done` file.

use std::time::Duration;

const DEFAULT_INITIAL: Duration = Duration::from_millis(125);
const DEFAULT_MAX: Duration = Duration::from_secs(10);

/// A sleeper that doubles its delay on every call, saturating at a ceiling.
///
/// Supervisors poll the filesystem rather than blocking on a child process
/// (§4.2b), so the first few polls land quickly after a short task finishes
/// and long-running tasks don't burn cycles busy-waiting.
pub struct ResponsiveSleeper {
    cur: Duration,
    max: Duration,
}

impl ResponsiveSleeper {
    pub fn new() -> Self {
        Self { cur: DEFAULT_INITIAL, max: DEFAULT_MAX }
    }

    pub fn with_bounds(initial: Duration, max: Duration) -> Self {
        Self { cur: initial, max }
    }

    /// Block for the current delay, then double it for next time.
    pub fn sleep(&mut self) {
        let this_sleep = self.cur.min(self.max);
        std::thread::sleep(this_sleep);
        self.cur = (self.cur * 2).min(self.max);
    }

    /// The delay the next call to [`sleep`](Self::sleep) will use, without
    /// advancing state. Exposed for tests that assert on backoff shape.
    pub fn peek(&self) -> Duration {
        self.cur.min(self.max)
    }
}

impl Default for ResponsiveSleeper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "sleeper_tests.rs"]
mod tests;
