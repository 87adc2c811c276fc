// src/release/github.rs

//! GitHub-backed release source.
//!
//! Queries the "list releases" endpoint with `per_page=1` and reports the
//! first entry's `tag_name`, which is the most recently published release
//! (pre-releases included).

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::{ReleaseLookupError, ReleaseSource};

const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct ReleaseEntry {
    tag_name: String,
}

#[derive(Debug, Clone)]
pub struct GithubReleaseSource {
    client: reqwest::Client,
    base_url: String,
}

impl GithubReleaseSource {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::with_base_url(DEFAULT_API_BASE)
    }

    /// Point the source at a different API base (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, anyhow::Error> {
        // GitHub rejects requests without a User-Agent.
        let client = reqwest::Client::builder()
            .user_agent(concat!("relwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ReleaseSource for GithubReleaseSource {
    async fn latest_version(&self, owner: &str, repo: &str) -> Result<String, ReleaseLookupError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/releases?per_page=1&page=1",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("requesting releases for {owner}/{repo}"))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(ReleaseLookupError::RateLimited(format!(
                "{status} from release API for {owner}/{repo}: {body}"
            )));
        }
        if !status.is_success() {
            return Err(ReleaseLookupError::Other(anyhow!(
                "release API returned {status} for {owner}/{repo}"
            )));
        }

        let releases: Vec<ReleaseEntry> = response
            .json()
            .await
            .with_context(|| format!("decoding release list for {owner}/{repo}"))?;
        let first = releases.into_iter().next().ok_or_else(|| {
            ReleaseLookupError::Other(anyhow!("no published releases for {owner}/{repo}"))
        })?;
        debug!(owner, repo, tag = %first.tag_name, "latest release fetched");
        Ok(first.tag_name)
    }
}
