// src/exec/mod.rs

//! Command execution layer.
//!
//! - [`command`]: tokenization and single-command spawning helpers.
//! - [`supervisor`]: the [`SequenceRunner`] contract plus the production
//!   supervisor that runs command sequences and handles cancellation.
//! - [`pipeline`]: dependency-ordered execution with environment composition
//!   and kill-sequence selection.

pub mod command;
pub mod pipeline;
pub mod supervisor;

pub use pipeline::{Pipeline, compose_env};
pub use supervisor::{EnvMap, SequenceRunner, Supervisor};
