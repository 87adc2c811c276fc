// src/config/mod.rs

//! Configuration document handling.
//!
//! - [`model`]: TOML-backed data model.
//! - [`store`]: load/save and per-project access.
//! - [`lock`]: advisory cross-process lock over the document.

pub mod lock;
pub mod model;
pub mod store;

pub use lock::{ProcessProbe, SignalProbe};
pub use model::{ConfigFile, DEFAULT_POLL_MINUTES, ProjectConfig, SettingsSection};
pub use store::ConfigStore;
