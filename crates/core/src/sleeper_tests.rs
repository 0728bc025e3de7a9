// SPDX-License-Identifier: MIT

use super::*;
use proptest::prelude::*;

#[test]
fn doubles_each_call_until_the_ceiling() {
    let mut s = ResponsiveSleeper::with_bounds(Duration::from_millis(1), Duration::from_millis(8));
    assert_eq!(s.peek(), Duration::from_millis(1));
    s.sleep();
    assert_eq!(s.peek(), Duration::from_millis(2));
    s.sleep();
    assert_eq!(s.peek(), Duration::from_millis(4));
    s.sleep();
    assert_eq!(s.peek(), Duration::from_millis(8));
    s.sleep();
    assert_eq!(s.peek(), Duration::from_millis(8), "must saturate, not overflow past max");
}

#[test]
fn default_bounds_match_spec() {
    let s = ResponsiveSleeper::new();
    assert_eq!(s.peek(), Duration::from_millis(125));
}

#[test]
fn initial_delay_already_above_max_is_clamped_on_first_peek() {
    let s = ResponsiveSleeper::with_bounds(Duration::from_secs(30), Duration::from_secs(10));
    assert_eq!(s.peek(), Duration::from_secs(10));
}

proptest! {
    /// §8 "Backoff bound": however the sleeper is seeded and however many
    /// times it's advanced, `peek()` never reports a delay past `max`.
    #[test]
    fn peek_never_exceeds_max(
        initial_ms in 0u64..20_000,
        max_ms in 1u64..20_000,
        advances in 0u32..10,
    ) {
        let mut s = ResponsiveSleeper::with_bounds(
            Duration::from_millis(initial_ms),
            Duration::from_millis(max_ms),
        );
        for _ in 0..advances {
            prop_assert!(s.peek() <= Duration::from_millis(max_ms));
            // Advance state without actually blocking the test thread.
            s.cur = (s.cur * 2).min(s.max);
        }
        prop_assert!(s.peek() <= Duration::from_millis(max_ms));
    }
}
