// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bernie-core: shared types for the task/worker/queue state machines.
//!
//! This crate has no knowledge of the worker pool's scheduling policy; it
//! only defines the value types that policy operates on, plus the
//! primitives (responsive sleeper, base-62 session namer, multiplexer
//! trait) that every attempt supervisor needs.

pub mod macros;

pub mod base62;
pub mod error;
pub mod sleeper;
pub mod task;
pub mod tmux;
pub mod worker;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use base62::{base62, SessionNamer};
pub use error::TaskError;
pub use sleeper::ResponsiveSleeper;
pub use task::{Task, TaskName, TaskStatus};
pub use tmux::{RealTmux, Tmux};
pub use worker::{WorkerName, WorkerState, WorkerStatus};
