// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Document format version written by `--setup`.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Default poll interval between cycles, in minutes.
pub const DEFAULT_POLL_MINUTES: f64 = 5.0;

/// Top-level configuration document as read from a TOML file.
///
/// ```toml
/// version = "1.0"
///
/// [settings]
/// locked = 0
/// poll_minutes = 5.0
///
/// [projects.build]
/// triggers = ["always"]
/// commands = ["make all"]
///
/// [projects.deploy]
/// triggers = ["release=acme/widget/1.0.0"]
/// depends_on = ["build"]
/// environment = ["DEPLOY_ENV=prod"]
/// commands = ["./deploy.sh"]
/// cleanup = ["./rollback.sh"]
/// ```
///
/// Projects are kept as raw TOML values and decoded per project on access, so
/// one malformed project skips only that project rather than failing the
/// whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// `[settings]` section. Required at daemon startup; absent in documents
    /// the daemon refuses to run with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsSection>,

    /// All projects from `[projects.<name>]`, keyed by project name.
    #[serde(default)]
    pub projects: BTreeMap<String, toml::Value>,
}

impl ConfigFile {
    /// Fresh document as written by `--setup`.
    pub fn default_document() -> Self {
        Self {
            version: Some(DOCUMENT_VERSION.to_string()),
            settings: Some(SettingsSection::default()),
            projects: BTreeMap::new(),
        }
    }
}

/// `[settings]` section: the lock record plus loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSection {
    /// Lock holder process id; `0` means unlocked.
    #[serde(default)]
    pub locked: u32,

    /// Sleep between poll cycles, in (possibly fractional) minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_minutes: Option<f64>,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            locked: 0,
            poll_minutes: Some(DEFAULT_POLL_MINUTES),
        }
    }
}

/// `[projects.<name>]` section.
///
/// All lists are ordered; declaration order is execution/evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Trigger strings, e.g. `"always"` or `"release=acme/widget/1.0.0"`.
    #[serde(default)]
    pub triggers: Vec<String>,

    /// Names of projects whose commands run before this project's own.
    /// Resolution is exactly one level deep: a dependency's own triggers and
    /// `depends_on` are ignored.
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// `KEY=VALUE` entries injected into spawned commands.
    #[serde(default)]
    pub environment: Vec<String>,

    /// Command lines run when a trigger fires.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Best-effort kill commands run when an active run is cancelled.
    #[serde(default)]
    pub cleanup: Vec<String>,
}
