use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use relwatch::release::{ReleaseLookupError, ReleaseSource};

/// Scripted response for one `owner/repo`.
#[derive(Debug, Clone)]
pub enum Scripted {
    Version(String),
    RateLimited(String),
    Error(String),
}

/// A fake release source with per-repository scripted responses and a call
/// counter.
#[derive(Debug, Default)]
pub struct FakeReleaseSource {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
}

impl FakeReleaseSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(owner: &str, repo: &str) -> String {
        format!("{owner}/{repo}")
    }

    pub fn returns(self, owner: &str, repo: &str, version: &str) -> Self {
        self.script(owner, repo, Scripted::Version(version.to_string()));
        self
    }

    pub fn rate_limits(self, owner: &str, repo: &str) -> Self {
        self.script(
            owner,
            repo,
            Scripted::RateLimited("abuse detection mechanism triggered".to_string()),
        );
        self
    }

    pub fn fails(self, owner: &str, repo: &str, message: &str) -> Self {
        self.script(owner, repo, Scripted::Error(message.to_string()));
        self
    }

    pub fn script(&self, owner: &str, repo: &str, response: Scripted) {
        self.responses
            .lock()
            .unwrap()
            .insert(Self::key(owner, repo), response);
    }

    /// Number of lookups made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for FakeReleaseSource {
    async fn latest_version(&self, owner: &str, repo: &str) -> Result<String, ReleaseLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get(&Self::key(owner, repo))
            .cloned();
        match scripted {
            Some(Scripted::Version(v)) => Ok(v),
            Some(Scripted::RateLimited(msg)) => Err(ReleaseLookupError::RateLimited(msg)),
            Some(Scripted::Error(msg)) => Err(ReleaseLookupError::Other(anyhow!(msg))),
            None => Err(ReleaseLookupError::Other(anyhow!(
                "no scripted response for {owner}/{repo}"
            ))),
        }
    }
}
