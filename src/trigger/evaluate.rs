// src/trigger/evaluate.rs

//! Trigger evaluation: decide fire/skip and build the evaluation context.

use semver::Version;
use tracing::debug;

use crate::errors::EvalError;
use crate::release::{ReleaseLookupError, ReleaseSource};
use crate::trigger::{EvaluationContext, Trigger};

/// Environment variable carrying the newly observed version on a fire.
pub const ENV_VERSION: &str = "VERSION";
/// Environment variable carrying the upstream tag name on a fire.
pub const ENV_TAG_NAME: &str = "TAG_NAME";

/// Evaluate one trigger, consulting the release source when needed.
pub async fn evaluate(
    trigger: &Trigger,
    source: &dyn ReleaseSource,
) -> Result<EvaluationContext, EvalError> {
    match trigger {
        Trigger::Always => Ok(EvaluationContext {
            fired: true,
            ..EvaluationContext::default()
        }),
        Trigger::Release {
            owner,
            repo,
            baseline,
        } => {
            let observed = source
                .latest_version(owner, repo)
                .await
                .map_err(|err| match err {
                    ReleaseLookupError::RateLimited(msg) => EvalError::RateLimited(msg),
                    ReleaseLookupError::Other(err) => EvalError::Lookup(err),
                })?;
            let fired = should_fire(baseline, &observed)?;
            debug!(
                owner,
                repo,
                baseline,
                observed,
                fired,
                "release trigger evaluated"
            );

            let env = if fired {
                vec![
                    (ENV_VERSION.to_string(), observed.clone()),
                    (ENV_TAG_NAME.to_string(), observed.clone()),
                ]
            } else {
                Vec::new()
            };
            Ok(EvaluationContext {
                fired,
                previous: Some(baseline.clone()),
                observed: Some(observed),
                env,
            })
        }
    }
}

/// True iff `observed` is strictly greater than `baseline` under semantic
/// version ordering. Unparsable input on either side is a classified error,
/// never a fire.
pub fn should_fire(baseline: &str, observed: &str) -> Result<bool, EvalError> {
    let old = parse_version(baseline)?;
    let new = parse_version(observed)?;
    Ok(new > old)
}

/// Parse a version string, tolerating the common `v` prefix on tag names.
fn parse_version(raw: &str) -> Result<Version, EvalError> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    Version::parse(stripped).map_err(|source| EvalError::VersionParse {
        value: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictly_greater_fires() {
        assert!(should_fire("1.0.0", "1.1.0").unwrap());
        assert!(should_fire("1.0.0", "2.0.0").unwrap());
        assert!(should_fire("1.0.0", "1.0.1").unwrap());
    }

    #[test]
    fn equal_or_lesser_never_fires() {
        assert!(!should_fire("1.1.0", "1.1.0").unwrap());
        assert!(!should_fire("1.1.0", "1.0.9").unwrap());
        assert!(!should_fire("2.0.0", "1.9.9").unwrap());
    }

    #[test]
    fn prerelease_precedence_is_honoured() {
        // A pre-release sorts below its release.
        assert!(should_fire("1.0.0-rc.1", "1.0.0").unwrap());
        assert!(!should_fire("1.0.0", "1.0.0-rc.1").unwrap());
        assert!(should_fire("1.0.0-alpha", "1.0.0-beta").unwrap());
    }

    #[test]
    fn tag_style_v_prefix_is_accepted() {
        assert!(should_fire("v1.0.0", "v1.1.0").unwrap());
        assert!(should_fire("1.0.0", "v1.1.0").unwrap());
    }

    #[test]
    fn unparsable_versions_are_classified_errors() {
        let err = should_fire("not-a-version", "1.0.0").unwrap_err();
        assert!(matches!(err, EvalError::VersionParse { .. }));
        let err = should_fire("1.0.0", "latest").unwrap_err();
        assert!(matches!(err, EvalError::VersionParse { .. }));
    }

    #[tokio::test]
    async fn always_fires_with_empty_context() {
        use crate::release::ReleaseLookupError;

        struct NoSource;
        #[async_trait::async_trait]
        impl ReleaseSource for NoSource {
            async fn latest_version(
                &self,
                _owner: &str,
                _repo: &str,
            ) -> Result<String, ReleaseLookupError> {
                panic!("always triggers must not consult the release source");
            }
        }

        let ctx = evaluate(&Trigger::Always, &NoSource).await.unwrap();
        assert!(ctx.fired);
        assert!(ctx.env.is_empty());
        assert!(ctx.observed.is_none());
    }
}
