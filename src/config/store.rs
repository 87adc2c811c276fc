// src/config/store.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::config::model::{ConfigFile, ProjectConfig, SettingsSection};
use crate::errors::FatalError;
use crate::fs::FileSystem;

/// The shared configuration document: projects, settings and the lock record.
///
/// The document is held in memory for the lifetime of the daemon; `save`
/// persists it as a whole-document overwrite (last writer wins, no merge).
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    doc: ConfigFile,
}

impl ConfigStore {
    /// Load the document from `path`, distinguishing "missing" from
    /// "unreadable or malformed" for the startup exit codes.
    pub fn load(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Result<Self, FatalError> {
        let path = path.into();
        if !fs.exists(&path) {
            return Err(FatalError::ConfigMissing { path });
        }
        let contents = fs
            .read_to_string(&path)
            .map_err(|source| FatalError::ConfigUnreadable {
                path: path.clone(),
                source,
            })?;
        let doc: ConfigFile =
            toml::from_str(&contents).map_err(|e| FatalError::ConfigUnreadable {
                path: path.clone(),
                source: anyhow!(e).context("parsing TOML configuration"),
            })?;
        debug!(path = ?path, projects = doc.projects.len(), "configuration loaded");
        Ok(Self { path, fs, doc })
    }

    /// Build a store around an already-constructed document (tests).
    pub fn from_document(
        path: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
        doc: ConfigFile,
    ) -> Self {
        Self {
            path: path.into(),
            fs,
            doc,
        }
    }

    /// Write a fresh default document, refusing to overwrite an existing one.
    pub fn write_default(path: &Path, fs: &dyn FileSystem) -> Result<()> {
        if fs.exists(path) {
            return Err(anyhow!("configuration file {:?} already exists", path));
        }
        let rendered = toml::to_string_pretty(&ConfigFile::default_document())
            .context("serializing default configuration")?;
        fs.write(path, rendered.as_bytes())
    }

    /// Where the document lives, for diagnostic messages.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project names in declaration (BTreeMap key) order.
    pub fn project_names(&self) -> Vec<String> {
        self.doc.projects.keys().cloned().collect()
    }

    /// Decode a single project. A failure here means the stored shape of that
    /// project cannot be understood; other projects are unaffected.
    pub fn project(&self, name: &str) -> Result<ProjectConfig> {
        let value = self
            .doc
            .projects
            .get(name)
            .ok_or_else(|| anyhow!("project {:?} is not defined in {:?}", name, self.path))?;
        value
            .clone()
            .try_into()
            .with_context(|| format!("decoding project {:?} in {:?}", name, self.path))
    }

    /// Replace a project's stored value (full overwrite).
    pub fn set_project(&mut self, name: &str, project: &ProjectConfig) -> Result<()> {
        let value = toml::Value::try_from(project)
            .with_context(|| format!("encoding project {:?}", name))?;
        self.doc.projects.insert(name.to_string(), value);
        Ok(())
    }

    pub fn settings(&self) -> Option<&SettingsSection> {
        self.doc.settings.as_ref()
    }

    /// Current lock holder pid; `0` means unlocked.
    pub fn lock_holder(&self) -> u32 {
        self.doc.settings.as_ref().map_or(0, |s| s.locked)
    }

    pub fn set_lock_holder(&mut self, holder: u32) {
        self.doc
            .settings
            .get_or_insert_with(SettingsSection::default)
            .locked = holder;
    }

    /// Persist the whole document.
    pub fn save(&self) -> Result<()> {
        let rendered =
            toml::to_string_pretty(&self.doc).context("serializing configuration document")?;
        self.fs
            .write(&self.path, rendered.as_bytes())
            .with_context(|| format!("writing configuration file {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    const DOC: &str = r#"
version = "1.0"

[settings]
locked = 0
poll_minutes = 1.5

[projects.build]
triggers = ["always"]
commands = ["make all"]

[projects.broken]
triggers = "not-a-list"
"#;

    fn store_from(doc: &str) -> ConfigStore {
        let fs = MockFileSystem::new();
        fs.add_file("Relwatch.toml", doc);
        ConfigStore::load("Relwatch.toml", Arc::new(fs)).unwrap()
    }

    #[test]
    fn loads_settings_and_projects() {
        let store = store_from(DOC);
        assert_eq!(store.lock_holder(), 0);
        assert_eq!(store.settings().unwrap().poll_minutes, Some(1.5));
        assert_eq!(store.project_names(), vec!["broken", "build"]);
    }

    #[test]
    fn decodes_projects_individually() {
        let store = store_from(DOC);
        let build = store.project("build").unwrap();
        assert_eq!(build.commands, vec!["make all"]);
        assert!(build.depends_on.is_empty());

        // One malformed project must not poison the others.
        assert!(store.project("broken").is_err());
        assert!(store.project("build").is_ok());
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let fs = Arc::new(MockFileSystem::new());
        let err = ConfigStore::load("absent.toml", fs).unwrap_err();
        assert!(matches!(err, FatalError::ConfigMissing { .. }));
    }

    #[test]
    fn set_project_round_trips_through_save() {
        let fs = MockFileSystem::new();
        fs.add_file("Relwatch.toml", DOC);
        let fs = Arc::new(fs);
        let mut store = ConfigStore::load("Relwatch.toml", fs.clone()).unwrap();

        let mut build = store.project("build").unwrap();
        build.triggers = vec!["release=acme/widget/2.0.0".to_string()];
        store.set_project("build", &build).unwrap();
        store.save().unwrap();

        let reloaded = ConfigStore::load("Relwatch.toml", fs).unwrap();
        assert_eq!(
            reloaded.project("build").unwrap().triggers,
            vec!["release=acme/widget/2.0.0"]
        );
    }

    #[test]
    fn write_default_refuses_to_overwrite() {
        let fs = MockFileSystem::new();
        ConfigStore::write_default(Path::new("new.toml"), &fs).unwrap();
        assert!(fs.exists(Path::new("new.toml")));
        assert!(ConfigStore::write_default(Path::new("new.toml"), &fs).is_err());
    }
}
