// SPDX-License-Identifier: MIT

//! The per-attempt task-execution supervisor: setup, launch, poll for
//! completion, finalize. Runs on its own OS thread per attempt, since it
//! performs blocking subprocess and filesystem calls (§5).

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use bernie_core::{ResponsiveSleeper, SessionNamer, Task, TaskError, TaskStatus, Tmux, WorkerName};

use crate::config::PoolConfig;

/// Outcome of one attempt. `None` means the task finished with no error.
pub type AttemptOutcome = Option<TaskError>;

/// Run exactly one attempt of `task` on behalf of `worker_name`.
///
/// Caller (`Worker::run`) is responsible for the worker-level guard (already
/// running / killed) *before* calling this — setup here unconditionally
/// increments `tries` and publishes `runner`, so it must never be entered
/// on a worker that shouldn't be dispatched to (§9 decision 3).
pub fn run_attempt(
    task: &Arc<Task>,
    worker_name: &WorkerName,
    manifest: &str,
    tmux: &dyn Tmux,
    config: &PoolConfig,
    session_namer: &SessionNamer,
) -> AttemptOutcome {
    let dir = match setup(task, worker_name, manifest) {
        Ok(dir) => dir,
        Err(err) => return Some(err),
    };

    let session = session_namer.next();
    if let Err(err) = launch(task, &dir, &session, tmux) {
        return finalize(task, &dir, Some(err));
    }

    let result = poll_for_completion(task, &dir, config);
    finalize(task, &dir, result)
}

/// §4.2a — critical section on the task's own lock (the worker-level lock
/// was already released by the caller's guard check).
fn setup(task: &Task, worker_name: &WorkerName, manifest: &str) -> Result<tempfile::TempDir, TaskError> {
    let mut status = task.status();
    status.done = false;
    status.err = None;
    status.runner = Some(worker_name.clone());
    status.tries += 1;

    let dir = match tempfile::Builder::new().prefix("bernie-task").tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            let err = TaskError::Setup(e.to_string());
            status.err = Some(err.clone());
            task.set_status(status);
            return Err(err);
        }
    };

    if let Err(e) = write_attempt_files(dir.path(), task, manifest) {
        let err = TaskError::Setup(e);
        status.err = Some(err.clone());
        task.set_status(status);
        return Err(err);
    }

    task.set_status(status);
    Ok(dir)
}

fn write_attempt_files(dir: &std::path::Path, task: &Task, manifest: &str) -> Result<(), String> {
    let manifest_path = dir.join("wmanifest");
    fs::write(&manifest_path, manifest).map_err(|e| e.to_string())?;
    fs::set_permissions(&manifest_path, fs::Permissions::from_mode(0o666)).map_err(|e| e.to_string())?;

    let done_path = dir.join("done");
    let script = build_script(&task.cmd, &done_path);
    let script_path = dir.join("do.sh");
    fs::write(&script_path, script).map_err(|e| e.to_string())?;
    fs::set_permissions(&script_path, fs::Permissions::from_mode(0o777)).map_err(|e| e.to_string())?;

    Ok(())
}

/// Builds the generated attempt script (§4.2a / §6).
fn build_script(cmd: &[String], done_path: &std::path::Path) -> String {
    let mut out = String::from("#!/bin/sh\n");
    for (i, arg) in cmd.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&shell_quote(arg));
    }
    out.push('\n');
    out.push_str("st=$?\necho exit status $st\necho $st > '");
    out.push_str(&done_path.to_string_lossy());
    out.push_str("'\n");
    out
}

fn shell_quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// §4.2b — synchronous; returns once the multiplexer has detached the
/// session.
fn launch(task: &Task, dir: &tempfile::TempDir, session: &str, tmux: &dyn Tmux) -> Result<(), TaskError> {
    let do_sh = dir.path().join("do.sh").to_string_lossy().to_string();
    let result = tmux.new_session(session, &do_sh);

    let mut status = task.status();
    status.session_id = session.to_string();
    if let Err(e) = &result {
        status.err = Some(TaskError::Launch(e.clone()));
        tracing::warn!(task = %task.name, session, error = %e, "failed to launch attempt");
    } else {
        tracing::debug!(task = %task.name, session, "attempt launched");
    }
    task.set_status(status);

    result.map_err(TaskError::Launch)
}

/// §4.2c — poll loop.
fn poll_for_completion(task: &Task, dir: &tempfile::TempDir, config: &PoolConfig) -> AttemptOutcome {
    let mut sleeper = ResponsiveSleeper::with_bounds(config.poll_initial, config.poll_max);
    let done_path = dir.path().join("done");

    loop {
        let status = task.status();
        if status.killed || status.err.as_ref().is_some_and(TaskError::is_task_killed) {
            return Some(TaskError::TaskKilled);
        }

        if done_path.exists() {
            return match fs::read_to_string(&done_path) {
                Ok(contents) => match contents.trim().parse::<i32>() {
                    Ok(0) => None,
                    Ok(code) => Some(TaskError::ExitStatus(code)),
                    Err(_) => Some(TaskError::MalformedDone(contents.trim().to_string())),
                },
                Err(e) => Some(TaskError::MalformedDone(e.to_string())),
            };
        }

        if task.status().err.as_ref().is_some_and(TaskError::is_worker_killed) {
            return Some(TaskError::WorkerKilled);
        }

        sleeper.sleep();
    }
}

/// §4.2d — finalize task status and clean up the attempt's temp directory.
fn finalize(task: &Task, dir: &tempfile::TempDir, result: AttemptOutcome) -> AttemptOutcome {
    let mut status = task.status();
    status.done = true;
    status.err = result.clone();
    if result.as_ref().is_some_and(TaskError::is_worker_killed) {
        status.tries = status.tries.saturating_sub(1);
    }
    task.set_status(status);

    if let Err(e) = fs::remove_dir_all(dir.path()) {
        tracing::warn!(task = %task.name, error = %e, "failed to remove attempt temp dir");
    }

    result
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
