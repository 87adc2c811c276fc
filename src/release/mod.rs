// src/release/mod.rs

//! Release version lookup.
//!
//! [`ReleaseSource`] is the collaborator boundary the trigger evaluator talks
//! to; [`github`] provides the production implementation. Tests substitute a
//! fake source.

pub mod github;

use async_trait::async_trait;
use thiserror::Error;

pub use github::GithubReleaseSource;

/// Failure modes of a release lookup.
///
/// Rate-limit/abuse responses are distinguished because the orchestrator loop
/// backs off on them instead of merely skipping the trigger.
#[derive(Error, Debug)]
pub enum ReleaseLookupError {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Source of the latest published version for an upstream repository.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Latest published version identifier (typically a tag name) for
    /// `owner/repo`.
    async fn latest_version(&self, owner: &str, repo: &str) -> Result<String, ReleaseLookupError>;
}
