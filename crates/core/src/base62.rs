// SPDX-License-Identifier: MIT

//! Base-62 encoding and multiplexer session-name generation.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALPHABET: &[u8] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Encode a non-negative 31-bit integer as base-62.
///
/// Matches the original `internal.Base62`: digits are pushed least
/// significant first and never reversed, so the output is not numerically
/// ordered. That's fine here — session names only need to be unique and
/// multiplexer/filesystem-safe.
pub fn base62(mut n: i32) -> String {
    debug_assert!(n >= 0, "base62 expects a non-negative int31: {n}");
    let mut digits = Vec::with_capacity(6);
    while n >= 62 {
        let r = (n % 62) as usize;
        n /= 62;
        digits.push(ALPHABET[r]);
    }
    digits.push(ALPHABET[n as usize]);
    String::from_utf8(digits).unwrap_or_default()
}

/// Prefix applied to every multiplexer session this crate creates.
pub const SESSION_PREFIX: &str = "bernie-task+";

/// Shared, thread-safe source of session-name randomness.
///
/// One `SessionNamer` is owned by the pool and handed to every attempt
/// supervisor; a name collision is astronomically unlikely but not
/// impossible (§5) — callers must treat a launch error as an ordinary
/// attempt failure rather than assuming uniqueness by construction.
pub struct SessionNamer {
    rng: Mutex<StdRng>,
}

impl SessionNamer {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// Seed deterministically, for reproducible tests.
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    /// Generate the next `bernie-task+<base62>` session name.
    pub fn next(&self) -> String {
        let n: i32 = self.rng.lock().gen_range(0..i32::MAX);
        format!("{SESSION_PREFIX}{}", base62(n))
    }
}

impl Default for SessionNamer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "base62_tests.rs"]
mod tests;
