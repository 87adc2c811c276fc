// src/engine/shutdown.rs

//! Signal listening and shutdown propagation.
//!
//! Exactly one listener task runs concurrently with the orchestrator loop.
//! Cancellation is message passing: the listener flips a watch channel and
//! the loop (and the supervisor, for an in-flight command) observes it
//! between synchronous steps. Nothing shares a process handle.

use tokio::sync::watch;
use tracing::{info, warn};

/// Spawn the signal listener and return the shutdown receiver.
///
/// - SIGHUP is logged and ignored (reload hint with no state change).
/// - SIGINT / SIGTERM flip the channel to request shutdown.
#[cfg(unix)]
pub fn spawn_signal_listener() -> watch::Receiver<bool> {
    use tokio::signal::unix::{SignalKind, signal};

    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "failed to install SIGHUP handler");
                return;
            }
        };
        let mut interrupt = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "failed to install SIGINT handler");
                return;
            }
        };
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = hangup.recv() => {
                    info!(pid = std::process::id(), "ignoring SIGHUP");
                }
                _ = interrupt.recv() => {
                    info!("received SIGINT, shutting down");
                    let _ = tx.send(true);
                    break;
                }
                _ = terminate.recv() => {
                    info!("received SIGTERM, shutting down");
                    let _ = tx.send(true);
                    break;
                }
            }
        }
    });

    rx
}

#[cfg(not(unix))]
pub fn spawn_signal_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            return;
        }
        info!("received Ctrl+C, shutting down");
        let _ = tx.send(true);
    });

    rx
}
