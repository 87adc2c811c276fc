// src/trigger/mod.rs

//! Trigger strings and their evaluation.
//!
//! A trigger is `type` or `type=params`. Recognized types are `always` and
//! `release=owner/repo/version`; anything else is ignored with a warning at
//! the evaluation site, never fatally.

pub mod evaluate;

use std::fmt;

pub use evaluate::{evaluate, should_fire};

/// A recognized trigger, decoded from its string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Fires every cycle; carries no state and is never rewritten.
    Always,
    /// Fires when the upstream repository publishes a version strictly
    /// greater than `baseline`.
    Release {
        owner: String,
        repo: String,
        baseline: String,
    },
}

impl Trigger {
    /// Decode a trigger string. Returns `None` for unknown or malformed
    /// triggers; the caller logs and moves on.
    pub fn parse(raw: &str) -> Option<Trigger> {
        let (kind, params) = match raw.split_once('=') {
            Some((kind, params)) => (kind.trim(), Some(params)),
            None => (raw.trim(), None),
        };
        match (kind, params) {
            ("always", None) => Some(Trigger::Always),
            ("release", Some(params)) => {
                let mut parts = params.splitn(3, '/');
                let owner = parts.next()?.to_string();
                let repo = parts.next()?.to_string();
                let baseline = parts.next()?.to_string();
                if owner.is_empty() || repo.is_empty() || baseline.is_empty() {
                    return None;
                }
                Some(Trigger::Release {
                    owner,
                    repo,
                    baseline,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Trigger {
    /// The exact persisted string form, used when rewriting baselines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Always => write!(f, "always"),
            Trigger::Release {
                owner,
                repo,
                baseline,
            } => write!(f, "release={owner}/{repo}/{baseline}"),
        }
    }
}

/// Transient result of evaluating one trigger. Discarded after the run
/// attempt; never persisted.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    /// Whether the trigger's pipeline should run this cycle.
    pub fired: bool,
    /// Stored baseline value, when the trigger carries one.
    pub previous: Option<String>,
    /// Newly observed comparison value.
    pub observed: Option<String>,
    /// Derived environment entries injected into the run, in order.
    pub env: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_always() {
        assert_eq!(Trigger::parse("always"), Some(Trigger::Always));
        assert_eq!(Trigger::parse(" always "), Some(Trigger::Always));
    }

    #[test]
    fn parses_release() {
        assert_eq!(
            Trigger::parse("release=acme/widget/1.0.0"),
            Some(Trigger::Release {
                owner: "acme".into(),
                repo: "widget".into(),
                baseline: "1.0.0".into(),
            })
        );
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        assert_eq!(Trigger::parse("on_demand"), None);
        assert_eq!(Trigger::parse("cron=*/5"), None);
        assert_eq!(Trigger::parse("release=acme/widget"), None);
        assert_eq!(Trigger::parse("release=//1.0.0"), None);
        assert_eq!(Trigger::parse("always=yes"), None);
    }

    #[test]
    fn display_matches_persisted_form() {
        let raw = "release=acme/widget/1.0.0";
        assert_eq!(Trigger::parse(raw).unwrap().to_string(), raw);
        assert_eq!(Trigger::Always.to_string(), "always");
    }
}
