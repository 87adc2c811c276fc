// src/exec/command.rs

//! Single-command helpers.
//!
//! Command lines are tokenized on whitespace only; quoting and shell
//! expansion are not honoured. This is a documented limitation: configured
//! commands with arguments containing spaces should be wrapped in a script.

use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::errors::ExecError;
use crate::exec::supervisor::EnvMap;

/// Split a command line into program and arguments. Returns `None` for a
/// blank line.
pub fn tokenize(line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = line.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Spawn one command with a fully composed environment.
///
/// Stdin is not connected; stdout/stderr are inherited so operators observe
/// live output.
pub fn spawn(line: &str, env: &EnvMap) -> Result<Option<Child>, ExecError> {
    let Some((program, args)) = tokenize(line) else {
        debug!("skipping blank command line");
        return Ok(None);
    };
    let mut cmd = Command::new(&program);
    cmd.args(&args)
        .env_clear()
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| ExecError::Spawn {
        command: line.to_string(),
        source,
    })?;
    Ok(Some(child))
}

/// Run one command to completion with the inherited process environment.
/// Used for kill sequences, which must not themselves be cancellable.
pub async fn run_inherited(line: &str) -> Result<(), ExecError> {
    let Some((program, args)) = tokenize(line) else {
        return Ok(());
    };
    let mut child = Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| ExecError::Spawn {
            command: line.to_string(),
            source,
        })?;
    let status = child.wait().await.map_err(|source| ExecError::Spawn {
        command: line.to_string(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(ExecError::NonZeroExit {
            command: line.to_string(),
            code: status.code().unwrap_or(-1),
        })
    }
}
