// src/engine/mod.rs

//! The orchestrator loop and its shutdown plumbing.
//!
//! One cooperative loop evaluates every project's triggers once per cycle,
//! runs the pipeline for each fire, commits trigger baselines on success, and
//! sleeps a configured interval between cycles. A single concurrent signal
//! listener requests cancellation over a watch channel.

pub mod orchestrator;
pub mod shutdown;

pub use orchestrator::{Orchestrator, OrchestratorOptions};
pub use shutdown::spawn_signal_listener;
