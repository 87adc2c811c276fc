// src/engine/orchestrator.rs

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::ConfigStore;
use crate::errors::{EvalError, ExecError};
use crate::exec::{Pipeline, SequenceRunner};
use crate::release::ReleaseSource;
use crate::trigger::{self, EvaluationContext, Trigger};

/// Fixed backoff applied after a rate-limited release lookup.
pub const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(5 * 60);

/// Timing and mode options for the loop.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Sleep between full passes over all projects.
    pub poll_interval: Duration,
    /// Sleep after a rate-limited release lookup.
    pub rate_limit_backoff: Duration,
    /// Run a single cycle and return (`--once`).
    pub run_once: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5 * 60),
            rate_limit_backoff: DEFAULT_RATE_LIMIT_BACKOFF,
            run_once: false,
        }
    }
}

/// Outcome of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Completed,
    ShutdownRequested,
}

/// The poll loop: `Idle → Evaluating → {Skipped | Firing} → Running →
/// {Committed | Aborted} → Idle`.
///
/// Owns the configuration store for the duration of the run and hands it
/// back on return so the caller can release the lock.
pub struct Orchestrator {
    store: ConfigStore,
    source: Box<dyn ReleaseSource>,
    runner: Box<dyn SequenceRunner>,
    shutdown: watch::Receiver<bool>,
    options: OrchestratorOptions,
}

impl Orchestrator {
    pub fn new(
        store: ConfigStore,
        source: Box<dyn ReleaseSource>,
        runner: Box<dyn SequenceRunner>,
        shutdown: watch::Receiver<bool>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            store,
            source,
            runner,
            shutdown,
            options,
        }
    }

    /// Run until a termination signal (or after one cycle with `run_once`).
    ///
    /// All per-trigger and per-project failures are logged and absorbed; the
    /// returned store lets the caller release the configuration lock.
    pub async fn run(mut self) -> ConfigStore {
        info!("orchestrator loop started");
        loop {
            if self.run_cycle().await == CycleOutcome::ShutdownRequested {
                break;
            }
            if self.options.run_once {
                debug!("single cycle complete, exiting loop");
                break;
            }
            debug!(interval = ?self.options.poll_interval, "sleeping until next cycle");
            if self.sleep_or_shutdown(self.options.poll_interval).await {
                break;
            }
        }
        info!("orchestrator loop exiting");
        self.store
    }

    /// One full pass over all projects, in declaration order.
    async fn run_cycle(&mut self) -> CycleOutcome {
        for name in self.store.project_names() {
            if *self.shutdown.borrow() {
                return CycleOutcome::ShutdownRequested;
            }
            let project = match self.store.project(&name) {
                Ok(project) => project,
                Err(err) => {
                    // Schema error: skip all triggers for this project.
                    error!(project = %name, error = %err, "cannot decode project, skipping its triggers");
                    continue;
                }
            };

            for raw in project.triggers.clone() {
                let Some(parsed) = Trigger::parse(&raw) else {
                    warn!(project = %name, trigger = %raw, "ignoring unknown trigger type");
                    continue;
                };

                let evaluated = trigger::evaluate(&parsed, self.source.as_ref()).await;
                let ctx = match evaluated {
                    Ok(ctx) => ctx,
                    Err(EvalError::RateLimited(msg)) => {
                        error!(
                            project = %name,
                            trigger = %raw,
                            backoff = ?self.options.rate_limit_backoff,
                            "rate limited by release source, backing off: {msg}"
                        );
                        if self.sleep_or_shutdown(self.options.rate_limit_backoff).await {
                            return CycleOutcome::ShutdownRequested;
                        }
                        continue;
                    }
                    Err(err) => {
                        warn!(project = %name, trigger = %raw, error = %err, "trigger evaluation failed, skipping");
                        continue;
                    }
                };

                if !ctx.fired {
                    debug!(project = %name, trigger = %raw, "trigger did not fire");
                    continue;
                }
                info!(project = %name, trigger = %raw, "trigger fired, running pipeline");

                let result = Pipeline::new(&self.store)
                    .run(&name, &project, &ctx, self.runner.as_mut())
                    .await;
                match result {
                    Ok(()) => {
                        info!(project = %name, trigger = %raw, "pipeline succeeded");
                        self.commit_baseline(&name, &raw, &parsed, &ctx);
                    }
                    Err(ExecError::Cancelled) => {
                        info!(project = %name, trigger = %raw, "pipeline cancelled by shutdown");
                        return CycleOutcome::ShutdownRequested;
                    }
                    Err(err) => {
                        // Aborted: no baseline rewrite, next trigger proceeds.
                        error!(project = %name, trigger = %raw, error = %err, "pipeline failed, baseline left unchanged");
                    }
                }
            }
        }
        CycleOutcome::Completed
    }

    /// Rewrite the fired trigger's stored baseline to the observed value and
    /// persist the whole document. `always` triggers carry no baseline.
    ///
    /// On a persistence failure the in-memory rewrite is rolled back, so the
    /// next cycle re-evaluates from the stale baseline (at-least-once re-fire
    /// is acceptable).
    fn commit_baseline(&mut self, name: &str, raw: &str, parsed: &Trigger, ctx: &EvaluationContext) {
        let Trigger::Release { owner, repo, .. } = parsed else {
            return;
        };
        let Some(observed) = ctx.observed.as_deref() else {
            return;
        };

        let original = match self.store.project(name) {
            Ok(project) => project,
            Err(err) => {
                error!(project = %name, error = %err, "cannot re-read project for baseline rewrite");
                return;
            }
        };

        let rewritten = Trigger::Release {
            owner: owner.clone(),
            repo: repo.clone(),
            baseline: observed.to_string(),
        }
        .to_string();

        let mut updated = original.clone();
        for entry in updated.triggers.iter_mut() {
            if *entry == raw {
                *entry = rewritten.clone();
            }
        }

        if let Err(err) = self.store.set_project(name, &updated) {
            error!(project = %name, error = %err, "cannot encode updated project, baseline left unchanged");
            return;
        }
        if let Err(err) = self.store.save() {
            error!(project = %name, error = %err, "cannot persist baseline rewrite, reverting");
            if let Err(revert_err) = self.store.set_project(name, &original) {
                error!(project = %name, error = %revert_err, "failed to revert in-memory baseline");
            }
            return;
        }
        info!(project = %name, trigger = %rewritten, "trigger baseline committed");
    }

    /// Sleep for `duration`, waking early on shutdown. Returns true when
    /// shutdown was requested.
    async fn sleep_or_shutdown(&mut self, duration: Duration) -> bool {
        if *self.shutdown.borrow() {
            return true;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.shutdown.changed() => true,
        }
    }
}
