// tests/trigger_roundtrip.rs

//! Scenario coverage for release triggers end-to-end:
//! - a newer upstream version fires, injects the version into the child
//!   environment, and rewrites the persisted baseline;
//! - an unchanged upstream version does nothing;
//! - re-evaluating right after a fire must not fire again.

use std::error::Error;

use relwatch_test_utils::builders::{ProjectBuilder, StoreBuilder};
use relwatch_test_utils::fake_release::FakeReleaseSource;
use relwatch_test_utils::fake_runner::RecordingRunner;
use relwatch_test_utils::{init_tracing, with_timeout};

use relwatch::engine::{Orchestrator, OrchestratorOptions};
use relwatch::fs::mock::MockFileSystem;
use tokio::sync::watch;

type TestResult = Result<(), Box<dyn Error>>;

fn once_options() -> OrchestratorOptions {
    OrchestratorOptions {
        run_once: true,
        ..OrchestratorOptions::default()
    }
}

#[tokio::test]
async fn newer_release_fires_and_rewrites_baseline() -> TestResult {
    with_timeout(async {
        init_tracing();

        let fs = MockFileSystem::new();
        let store = StoreBuilder::new()
            .with_project(
                "widget",
                ProjectBuilder::new()
                    .trigger("release=acme/widget/1.0.0")
                    .command("deploy.sh")
                    .build(),
            )
            .build_on(fs.clone());

        let source = FakeReleaseSource::new().returns("acme", "widget", "1.1.0");
        let runner = RecordingRunner::new();
        let records = runner.records();

        let (_tx, rx) = watch::channel(false);
        let orchestrator = Orchestrator::new(
            store,
            Box::new(source),
            Box::new(runner),
            rx,
            once_options(),
        );
        let store = orchestrator.run().await;

        // The pipeline ran with the derived version in its environment.
        let recorded = records.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].label, "widget");
        assert_eq!(recorded[0].commands, vec!["deploy.sh"]);
        assert_eq!(recorded[0].env.get("VERSION").unwrap(), "1.1.0");
        assert_eq!(recorded[0].env.get("TAG_NAME").unwrap(), "1.1.0");

        // The baseline was rewritten in place and persisted.
        let widget = store.project("widget")?;
        assert_eq!(widget.triggers, vec!["release=acme/widget/1.1.0"]);
        let saved = fs.contents("Relwatch.toml").expect("document persisted");
        assert!(saved.contains("release=acme/widget/1.1.0"));

        Ok(())
    })
    .await
}

#[tokio::test]
async fn unchanged_release_does_not_fire() -> TestResult {
    with_timeout(async {
        init_tracing();

        let store = StoreBuilder::new()
            .with_project(
                "widget",
                ProjectBuilder::new()
                    .trigger("release=acme/widget/1.0.0")
                    .command("deploy.sh")
                    .build(),
            )
            .build();

        let source = FakeReleaseSource::new().returns("acme", "widget", "1.0.0");
        let runner = RecordingRunner::new();
        let records = runner.records();

        let (_tx, rx) = watch::channel(false);
        let orchestrator = Orchestrator::new(
            store,
            Box::new(source),
            Box::new(runner),
            rx,
            once_options(),
        );
        let store = orchestrator.run().await;

        assert!(records.lock().unwrap().is_empty());
        let widget = store.project("widget")?;
        assert_eq!(widget.triggers, vec!["release=acme/widget/1.0.0"]);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn refiring_after_commit_requires_a_newer_version() -> TestResult {
    with_timeout(async {
        init_tracing();

        let store = StoreBuilder::new()
            .with_project(
                "widget",
                ProjectBuilder::new()
                    .trigger("release=acme/widget/1.0.0")
                    .command("deploy.sh")
                    .build(),
            )
            .build();

        let source = FakeReleaseSource::new().returns("acme", "widget", "1.1.0");
        let runner = RecordingRunner::new();
        let records = runner.records();

        let (_tx, rx) = watch::channel(false);
        let orchestrator = Orchestrator::new(
            store,
            Box::new(source),
            Box::new(runner),
            rx,
            once_options(),
        );
        let store = orchestrator.run().await;
        assert_eq!(records.lock().unwrap().len(), 1);

        // Second cycle against the same upstream version: no fire.
        let source = FakeReleaseSource::new().returns("acme", "widget", "1.1.0");
        let runner = RecordingRunner::new();
        let records = runner.records();
        let (_tx, rx) = watch::channel(false);
        let orchestrator = Orchestrator::new(
            store,
            Box::new(source),
            Box::new(runner),
            rx,
            once_options(),
        );
        let store = orchestrator.run().await;

        assert!(records.lock().unwrap().is_empty());
        assert_eq!(
            store.project("widget")?.triggers,
            vec!["release=acme/widget/1.1.0"]
        );

        Ok(())
    })
    .await
}

#[tokio::test]
async fn unparsable_versions_and_lookup_failures_skip_quietly() -> TestResult {
    with_timeout(async {
        init_tracing();

        let store = StoreBuilder::new()
            .with_project(
                "bad-baseline",
                ProjectBuilder::new()
                    .trigger("release=acme/widget/not-a-version")
                    .command("deploy.sh")
                    .build(),
            )
            .with_project(
                "broken-lookup",
                ProjectBuilder::new()
                    .trigger("release=acme/gone/1.0.0")
                    .command("deploy.sh")
                    .build(),
            )
            .with_project(
                "unknown-trigger",
                ProjectBuilder::new()
                    .trigger("on_demand")
                    .command("deploy.sh")
                    .build(),
            )
            .build();

        let source = FakeReleaseSource::new()
            .returns("acme", "widget", "1.1.0")
            .fails("acme", "gone", "404 not found");
        let runner = RecordingRunner::new();
        let records = runner.records();

        let (_tx, rx) = watch::channel(false);
        let orchestrator = Orchestrator::new(
            store,
            Box::new(source),
            Box::new(runner),
            rx,
            once_options(),
        );
        orchestrator.run().await;

        // Nothing fires, nothing crashes.
        assert!(records.lock().unwrap().is_empty());

        Ok(())
    })
    .await
}
