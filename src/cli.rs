// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `relwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "relwatch",
    version,
    about = "Run command pipelines when upstream release triggers fire.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the configuration file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Relwatch.toml")]
    pub config: String,

    /// Create a fresh configuration file and exit.
    #[arg(long)]
    pub setup: bool,

    /// Forcefully release the configuration lock and exit.
    #[arg(long)]
    pub unlock: bool,

    /// Run a single poll cycle and exit instead of looping.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RELWATCH_LOG` or a default of `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
