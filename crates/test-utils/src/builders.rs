#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use relwatch::config::{ConfigFile, ConfigStore, ProjectConfig, SettingsSection};
use relwatch::fs::mock::MockFileSystem;

/// Builder for a configuration document, producing a ready `ConfigStore`
/// backed by a mock filesystem.
pub struct StoreBuilder {
    settings: SettingsSection,
    projects: Vec<(String, ProjectConfig)>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            settings: SettingsSection::default(),
            projects: Vec::new(),
        }
    }

    pub fn with_project(mut self, name: &str, project: ProjectConfig) -> Self {
        self.projects.push((name.to_string(), project));
        self
    }

    pub fn with_lock_holder(mut self, pid: u32) -> Self {
        self.settings.locked = pid;
        self
    }

    pub fn with_poll_minutes(mut self, minutes: f64) -> Self {
        self.settings.poll_minutes = Some(minutes);
        self
    }

    /// Build a store on the given mock filesystem, so tests can inspect
    /// saved documents and force write failures.
    pub fn build_on(self, fs: MockFileSystem) -> ConfigStore {
        let doc = ConfigFile {
            version: Some("1.0".to_string()),
            settings: Some(self.settings),
            projects: BTreeMap::new(),
        };
        let mut store = ConfigStore::from_document("Relwatch.toml", Arc::new(fs), doc);
        for (name, project) in &self.projects {
            store
                .set_project(name, project)
                .expect("project config must encode to TOML");
        }
        store
    }

    pub fn build(self) -> ConfigStore {
        self.build_on(MockFileSystem::new())
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProjectConfig`.
pub struct ProjectBuilder {
    project: ProjectConfig,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            project: ProjectConfig::default(),
        }
    }

    pub fn trigger(mut self, raw: &str) -> Self {
        self.project.triggers.push(raw.to_string());
        self
    }

    pub fn depends_on(mut self, name: &str) -> Self {
        self.project.depends_on.push(name.to_string());
        self
    }

    pub fn env(mut self, entry: &str) -> Self {
        self.project.environment.push(entry.to_string());
        self
    }

    pub fn command(mut self, line: &str) -> Self {
        self.project.commands.push(line.to_string());
        self
    }

    pub fn cleanup(mut self, line: &str) -> Self {
        self.project.cleanup.push(line.to_string());
        self
    }

    pub fn build(self) -> ProjectConfig {
        self.project
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}
