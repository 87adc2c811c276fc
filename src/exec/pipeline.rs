// src/exec/pipeline.rs

//! Dependency-ordered pipeline execution.
//!
//! When a project's trigger fires, its declared dependencies run first, in
//! order, then the project's own commands. Resolution is exactly one level
//! deep: a dependency's own triggers and `depends_on` are never consulted.

use tracing::{info, warn};

use crate::config::{ConfigStore, ProjectConfig};
use crate::errors::ExecError;
use crate::exec::supervisor::{EnvMap, SequenceRunner};
use crate::trigger::EvaluationContext;

/// Executes one firing project's pipeline against a sequence runner.
pub struct Pipeline<'a> {
    store: &'a ConfigStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    /// Run dependencies then the project itself, returning the first failure.
    ///
    /// Kill-sequence selection: the active sequence starts as the owning
    /// project's `cleanup`; while a dependency with its own `cleanup` runs,
    /// that dependency's sequence is active instead, and the owning project's
    /// is restored afterwards.
    pub async fn run(
        &self,
        name: &str,
        project: &ProjectConfig,
        ctx: &EvaluationContext,
        runner: &mut dyn SequenceRunner,
    ) -> Result<(), ExecError> {
        for dep_name in &project.depends_on {
            let dep = self
                .store
                .project(dep_name)
                .map_err(|_| ExecError::UnknownDependency(dep_name.clone()))?;

            let kill_seq = if dep.cleanup.is_empty() {
                project.cleanup.clone()
            } else {
                info!(
                    project = name,
                    dependency = %dep_name,
                    "using dependency's own kill sequence while it runs"
                );
                dep.cleanup.clone()
            };

            let env = compose_env(&ctx.env, &dep.environment);
            info!(project = name, dependency = %dep_name, "running dependency");
            runner
                .run_sequence(dep_name.clone(), dep.commands.clone(), env, kill_seq)
                .await?;
        }

        let env = compose_env(&ctx.env, &project.environment);
        runner
            .run_sequence(
                name.to_string(),
                project.commands.clone(),
                env,
                project.cleanup.clone(),
            )
            .await
    }
}

/// Compose a child environment. Later layers override earlier ones:
/// derived trigger entries, then the declared `KEY=VALUE` entries of the unit
/// being run, then the supervisor's own process environment.
pub fn compose_env(derived: &[(String, String)], declared: &[String]) -> EnvMap {
    let mut env = EnvMap::new();
    for (key, value) in derived {
        env.insert(key.clone(), value.clone());
    }
    for entry in declared {
        match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                env.insert(key.to_string(), value.to_string());
            }
            _ => warn!(entry = %entry, "ignoring malformed environment entry"),
        }
    }
    env.extend(std::env::vars());
    env
}
