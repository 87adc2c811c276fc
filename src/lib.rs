// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod release;
pub mod trigger;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cli::CliArgs;
use crate::config::{ConfigStore, DEFAULT_POLL_MINUTES, SignalProbe, lock};
use crate::engine::{Orchestrator, OrchestratorOptions, spawn_signal_listener};
use crate::errors::FatalError;
use crate::exec::Supervisor;
use crate::fs::RealFileSystem;
use crate::release::GithubReleaseSource;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and the maintenance modes (`--setup`, `--unlock`)
/// - the configuration lock
/// - the signal listener
/// - the orchestrator loop and its supervisor/release source
///
/// Returns the fatal condition (with its exit code) when startup or shutdown
/// fails; a clean unlock-and-exit path returns `Ok(())`.
pub async fn run(args: CliArgs) -> Result<(), FatalError> {
    let config_path = PathBuf::from(&args.config);
    let fs = Arc::new(RealFileSystem);

    if args.setup {
        ConfigStore::write_default(&config_path, fs.as_ref()).map_err(FatalError::Setup)?;
        info!(path = ?config_path, "configuration file created");
        return Ok(());
    }

    let mut store = ConfigStore::load(&config_path, fs)?;

    if args.unlock {
        lock::release(&mut store).map_err(FatalError::Unlock)?;
        info!(path = ?config_path, "configuration lock released");
        return Ok(());
    }

    let settings = store
        .settings()
        .cloned()
        .ok_or_else(|| FatalError::MissingSettings {
            path: config_path.clone(),
        })?;
    let poll_minutes = settings.poll_minutes.unwrap_or(DEFAULT_POLL_MINUTES);
    if !poll_minutes.is_finite() || poll_minutes <= 0.0 {
        return Err(FatalError::BadPollInterval {
            value: poll_minutes,
        });
    }
    let poll_interval = Duration::from_secs_f64(poll_minutes * 60.0);

    if store.project_names().is_empty() {
        return Err(FatalError::NoProjects { path: config_path });
    }

    let pid = std::process::id();
    lock::acquire(&mut store, &SignalProbe, pid).map_err(FatalError::Lock)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid,
        path = ?config_path,
        "relwatch started and configuration locked"
    );

    let shutdown_rx = spawn_signal_listener();
    let source = GithubReleaseSource::new().map_err(FatalError::Startup)?;
    let runner = Supervisor::new(shutdown_rx.clone());

    let options = OrchestratorOptions {
        poll_interval,
        run_once: args.once,
        ..OrchestratorOptions::default()
    };
    let orchestrator = Orchestrator::new(
        store,
        Box::new(source),
        Box::new(runner),
        shutdown_rx,
        options,
    );

    let mut store = orchestrator.run().await;

    lock::release(&mut store).map_err(FatalError::Unlock)?;
    info!("configuration unlocked, exiting gracefully");
    Ok(())
}
