// src/errors.rs

//! Crate-wide error types.
//!
//! Each layer has its own classified error enum so the orchestrator loop can
//! apply per-kind policy (skip trigger, back off, abort pipeline, exit):
//!
//! - [`FatalError`]: startup/shutdown conditions that terminate the process
//!   with a distinct exit code.
//! - [`EvalError`]: trigger evaluation failures; never fatal to the loop.
//! - [`ExecError`]: command pipeline failures, including cancellation.
//! - [`LockError`]: configuration lock acquire/release failures.

use std::path::PathBuf;

use thiserror::Error;

/// Process exit codes, part of the observable contract.
pub mod exit_codes {
    /// Configuration document missing or unreadable.
    pub const CONFIG_MISSING: i32 = 3;
    /// `settings.poll_minutes` is not a usable duration.
    pub const BAD_POLL_INTERVAL: i32 = 19;
    /// `--setup` could not write the new configuration document.
    pub const SETUP_FAILED: i32 = 30;
    /// The document has no `[settings]` section.
    pub const MISSING_SETTINGS: i32 = 120;
    /// Another live process holds the lock, or the lock could not be persisted.
    pub const LOCK_FAILED: i32 = 211;
    /// The lock could not be released at shutdown.
    pub const UNLOCK_FAILED: i32 = 212;
    /// The document defines no projects.
    pub const NO_PROJECTS: i32 = 404;
}

/// Conditions that end the process before or after the orchestrator loop.
#[derive(Error, Debug)]
pub enum FatalError {
    #[error("configuration file {path:?} not found; use --setup to create one")]
    ConfigMissing { path: PathBuf },

    #[error("could not read configuration file {path:?}: {source}")]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("configuration file {path:?} has no [settings] section")]
    MissingSettings { path: PathBuf },

    #[error("settings.poll_minutes is not a usable interval: {value}")]
    BadPollInterval { value: f64 },

    #[error("no projects defined in configuration file {path:?}")]
    NoProjects { path: PathBuf },

    #[error("could not lock configuration file: {0}")]
    Lock(#[source] LockError),

    #[error("could not release configuration lock: {0}")]
    Unlock(#[source] LockError),

    #[error("could not create configuration file: {0}")]
    Setup(#[source] anyhow::Error),

    #[error("startup failed: {0}")]
    Startup(#[source] anyhow::Error),
}

impl FatalError {
    /// Exit code for this condition.
    pub fn exit_code(&self) -> i32 {
        match self {
            FatalError::ConfigMissing { .. } | FatalError::ConfigUnreadable { .. } => {
                exit_codes::CONFIG_MISSING
            }
            FatalError::MissingSettings { .. } => exit_codes::MISSING_SETTINGS,
            FatalError::BadPollInterval { .. } => exit_codes::BAD_POLL_INTERVAL,
            FatalError::NoProjects { .. } => exit_codes::NO_PROJECTS,
            FatalError::Lock(_) => exit_codes::LOCK_FAILED,
            FatalError::Unlock(_) => exit_codes::UNLOCK_FAILED,
            FatalError::Setup(_) => exit_codes::SETUP_FAILED,
            FatalError::Startup(_) => 1,
        }
    }
}

/// Trigger evaluation failures. All of these are logged and skipped by the
/// orchestrator loop; `RateLimited` additionally sleeps a fixed backoff.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("release source rate limited: {0}")]
    RateLimited(String),

    #[error("release lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),

    #[error("unparsable version {value:?}: {source}")]
    VersionParse {
        value: String,
        #[source]
        source: semver::Error,
    },
}

/// Command pipeline failures.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to spawn {command:?}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command {command:?} exited with status {code}")]
    NonZeroExit { command: String, code: i32 },

    #[error("dependency project {0:?} is not defined in the configuration")]
    UnknownDependency(String),

    #[error("run cancelled by shutdown signal")]
    Cancelled,
}

/// Configuration lock failures.
#[derive(Error, Debug)]
pub enum LockError {
    #[error("configuration is locked by live process {pid}")]
    HeldByLiveProcess { pid: u32 },

    #[error("could not persist lock record: {0}")]
    Persist(#[source] anyhow::Error),
}

pub use anyhow::{Error, Result};
