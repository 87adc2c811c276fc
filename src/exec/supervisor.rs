// src/exec/supervisor.rs

//! Sequential command-sequence execution with signal-driven cancellation.
//!
//! The supervisor owns the handle of whichever command is currently active,
//! so cancellation never races the main loop over a shared handle: the
//! shutdown signal arrives as a message on a watch channel and the supervisor
//! reacts to it between (and inside) synchronous steps.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::errors::ExecError;
use crate::exec::command;

/// Fully composed child environment, deterministic iteration order.
pub type EnvMap = BTreeMap<String, String>;

/// Contract for running one ordered command sequence.
///
/// Production code uses [`Supervisor`]; tests substitute a recording fake so
/// ordering, environment composition and kill-sequence selection can be
/// asserted without spawning processes.
pub trait SequenceRunner: Send {
    /// Run `commands` in order with `env`, stopping at the first failure.
    ///
    /// `kill_seq` is the currently active kill sequence: it is invoked
    /// best-effort only when the run is cancelled by a shutdown signal, not
    /// on ordinary command failure.
    fn run_sequence(
        &mut self,
        label: String,
        commands: Vec<String>,
        env: EnvMap,
        kill_seq: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<(), ExecError>> + Send + '_>>;
}

/// Production sequence runner.
pub struct Supervisor {
    shutdown: watch::Receiver<bool>,
}

impl Supervisor {
    pub fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self { shutdown }
    }

    /// Run one command, watching for cancellation while it is active.
    ///
    /// Returns `Cancelled` after killing the child if the shutdown signal
    /// fires mid-run.
    async fn run_one(&mut self, line: &str, env: &EnvMap) -> Result<(), ExecError> {
        let Some(mut child) = command::spawn(line, env)? else {
            return Ok(());
        };
        debug!(command = line, "command started");

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|source| ExecError::Spawn {
                    command: line.to_string(),
                    source,
                })?;
                if status.success() {
                    debug!(command = line, "command succeeded");
                    Ok(())
                } else {
                    Err(ExecError::NonZeroExit {
                        command: line.to_string(),
                        code: status.code().unwrap_or(-1),
                    })
                }
            }
            _ = self.shutdown.changed() => {
                info!(command = line, "terminating active command on shutdown");
                if let Err(err) = child.kill().await {
                    warn!(command = line, error = %err, "failed to kill active command");
                }
                Err(ExecError::Cancelled)
            }
        }
    }

    /// Best-effort kill sequence: one command at a time, logging but not
    /// aborting on a kill command's own failure.
    async fn run_kill_sequence(kill_seq: &[String]) {
        for line in kill_seq {
            info!(command = %line, "running kill command");
            if let Err(err) = command::run_inherited(line).await {
                error!(command = %line, error = %err, "kill command failed");
            }
        }
    }
}

impl SequenceRunner for Supervisor {
    fn run_sequence(
        &mut self,
        label: String,
        commands: Vec<String>,
        env: EnvMap,
        kill_seq: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<(), ExecError>> + Send + '_>> {
        Box::pin(async move {
            if *self.shutdown.borrow() {
                return Err(ExecError::Cancelled);
            }
            for line in &commands {
                info!(sequence = %label, command = %line, "running command");
                match self.run_one(line, &env).await {
                    Ok(()) => {}
                    Err(ExecError::Cancelled) => {
                        Self::run_kill_sequence(&kill_seq).await;
                        return Err(ExecError::Cancelled);
                    }
                    Err(err) => {
                        error!(sequence = %label, command = %line, error = %err, "command failed");
                        return Err(err);
                    }
                }
            }
            Ok(())
        })
    }
}
