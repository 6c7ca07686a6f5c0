// Flag evaluation: the provider-facing trait, its error type, and the client
// built from configuration.

pub mod context;
pub mod flagd;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::FlagdConfig;

pub use context::EvaluationContext;
pub use flagd::FlagdEvaluator;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FlagError {
    #[error("flag provider is disabled")]
    Disabled,

    #[error("failed to reach flag provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("flag provider returned status {status} ({code}): {message}")]
    Provider {
        status: u16,
        code: String,
        message: String,
    },

    #[error("malformed flag provider response: {0}")]
    MalformedResponse(String),

    #[error("flag evaluation timed out after {0:?}")]
    Timeout(Duration),
}

// ---------------------------------------------------------------------------
// FlagEvaluator
// ---------------------------------------------------------------------------

/// A remote (or fake) key/value flag resolver.
///
/// Implementations are shared across concurrent requests and must only
/// perform read-only evaluation.
#[async_trait]
pub trait FlagEvaluator: Send + Sync {
    /// Resolve `flag_key` to a string for `context`.
    ///
    /// `default_value` is what the caller will fall back to; providers may
    /// return it for flags that resolve to "no value" (e.g. disabled flags).
    async fn evaluate_string(
        &self,
        flag_key: &str,
        default_value: &str,
        context: &EvaluationContext,
    ) -> Result<String, FlagError>;
}

// ---------------------------------------------------------------------------
// FlagClient wrapper
// ---------------------------------------------------------------------------

/// The evaluator used by the server: either a live flagd connection or
/// disabled, in which case every evaluation fails and callers use defaults.
pub enum FlagClient {
    Flagd(FlagdEvaluator),
    Disabled,
}

impl FlagClient {
    /// Build a client from the `[flagd]` config section.
    pub fn from_config(config: &FlagdConfig) -> Result<Self, FlagError> {
        if !config.enabled {
            return Ok(FlagClient::Disabled);
        }
        Ok(FlagClient::Flagd(FlagdEvaluator::from_config(config)?))
    }
}

#[async_trait]
impl FlagEvaluator for FlagClient {
    async fn evaluate_string(
        &self,
        flag_key: &str,
        default_value: &str,
        context: &EvaluationContext,
    ) -> Result<String, FlagError> {
        match self {
            FlagClient::Flagd(client) => {
                client
                    .evaluate_string(flag_key, default_value, context)
                    .await
            }
            FlagClient::Disabled => Err(FlagError::Disabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_builds_disabled_client() {
        let config = FlagdConfig {
            enabled: false,
            ..FlagdConfig::default()
        };
        let client = FlagClient::from_config(&config).unwrap();
        assert!(matches!(client, FlagClient::Disabled));
    }

    #[test]
    fn enabled_config_builds_flagd_client() {
        let client = FlagClient::from_config(&FlagdConfig::default()).unwrap();
        match client {
            FlagClient::Flagd(inner) => {
                assert_eq!(inner.base_url(), "http://localhost:8013");
            }
            FlagClient::Disabled => panic!("expected flagd client"),
        }
    }

    #[tokio::test]
    async fn disabled_client_always_errors() {
        let client = FlagClient::Disabled;
        let ctx = EvaluationContext::for_user("u", "user");
        let result = client.evaluate_string("any-flag", "simple", &ctx).await;
        assert!(matches!(result, Err(FlagError::Disabled)));
    }

    #[test]
    fn provider_error_message_includes_code() {
        let err = FlagError::Provider {
            status: 404,
            code: "not_found".into(),
            message: "flag not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "flag provider returned status 404 (not_found): flag not found"
        );
    }
}
