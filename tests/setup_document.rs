// tests/setup_document.rs

//! The `--setup` document round-trips through the real filesystem and is
//! immediately usable by the daemon.

use std::error::Error;
use std::sync::Arc;

use relwatch_test_utils::init_tracing;
use tempfile::tempdir;

use relwatch::config::ConfigStore;
use relwatch::fs::RealFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn default_document_round_trips() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("Relwatch.toml");

    ConfigStore::write_default(&path, &RealFileSystem)?;
    let store = ConfigStore::load(&path, Arc::new(RealFileSystem))?;

    let settings = store.settings().expect("settings section present");
    assert_eq!(settings.locked, 0);
    assert_eq!(settings.poll_minutes, Some(5.0));
    assert!(store.project_names().is_empty());

    // Refuses to clobber an existing document.
    assert!(ConfigStore::write_default(&path, &RealFileSystem).is_err());
    Ok(())
}
