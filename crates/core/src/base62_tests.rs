// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn zero_encodes_to_single_digit() {
    assert_eq!(base62(0), "0");
}

#[test]
fn single_digit_values_map_directly_to_alphabet() {
    assert_eq!(base62(9), "9");
    assert_eq!(base62(10), "a");
    assert_eq!(base62(35), "z");
    assert_eq!(base62(36), "A");
    assert_eq!(base62(61), "Z");
}

#[test]
fn multi_digit_values_emit_least_significant_digit_first() {
    // 62 = 1*62 + 0 -> remainder 0 pushed first, then quotient 1.
    assert_eq!(base62(62), "0a");
    assert_eq!(base62(124), "0c");
}

#[test]
fn session_namer_applies_prefix() {
    let namer = SessionNamer::from_seed(42);
    let name = namer.next();
    assert!(name.starts_with(SESSION_PREFIX));
    assert!(name.len() > SESSION_PREFIX.len());
}

#[test]
fn session_namer_is_thread_safe_and_produces_distinct_names() {
    use std::collections::HashSet;
    use std::sync::Arc;

    let namer = Arc::new(SessionNamer::from_seed(7));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let namer = Arc::clone(&namer);
            std::thread::spawn(move || namer.next())
        })
        .collect();
    let names: HashSet<String> =
        handles.into_iter().map(|h| h.join().expect("namer thread panicked")).collect();
    assert_eq!(names.len(), 8, "expected 8 distinct session names, got {names:?}");
}
