// flagd HTTP evaluation client.
//
// Speaks the JSON flavour of flagd's Connect evaluation service:
// `POST /flagd.evaluation.v1.Service/ResolveString` with
// `{ "flagKey": ..., "context": {...} }`. Successful responses carry
// `{ "value", "variant", "reason" }`; failures are a non-2xx status with a
// `{ "code", "message" }` body.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{EvaluationContext, FlagError, FlagEvaluator};
use crate::config::FlagdConfig;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const RESOLVE_STRING_PATH: &str = "/flagd.evaluation.v1.Service/ResolveString";

/// Reason flagd reports for a flag whose state is DISABLED.
const REASON_DISABLED: &str = "DISABLED";
/// Reason flagd reports when resolution itself failed.
const REASON_ERROR: &str = "ERROR";

// ---------------------------------------------------------------------------
// FlagdEvaluator
// ---------------------------------------------------------------------------

/// Evaluates flags against a flagd instance over HTTP.
///
/// The underlying `reqwest::Client` is connection-pooled and safe to share,
/// so one evaluator serves every request.
pub struct FlagdEvaluator {
    http: reqwest::Client,
    base_url: String,
}

impl FlagdEvaluator {
    /// Create an evaluator for `host:port`. `tls` selects https. Every
    /// request is bounded by `timeout`.
    pub fn new(host: &str, port: u16, tls: bool, timeout: Duration) -> Result<Self, FlagError> {
        let scheme = if tls { "https" } else { "http" };
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: format!("{scheme}://{host}:{port}"),
        })
    }

    pub fn from_config(config: &FlagdConfig) -> Result<Self, FlagError> {
        Self::new(&config.host, config.port, config.tls, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve_string_url(&self) -> String {
        format!("{}{RESOLVE_STRING_PATH}", self.base_url)
    }
}

#[async_trait]
impl FlagEvaluator for FlagdEvaluator {
    async fn evaluate_string(
        &self,
        flag_key: &str,
        default_value: &str,
        context: &EvaluationContext,
    ) -> Result<String, FlagError> {
        let body = serde_json::json!({
            "flagKey": flag_key,
            "context": context.to_json(),
        });

        let response = self
            .http
            .post(self.resolve_string_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let (code, message) = parse_error_body(&text);
            return Err(FlagError::Provider {
                status: status.as_u16(),
                code,
                message,
            });
        }

        let resolved =
            parse_resolve_response(&text).ok_or_else(|| FlagError::MalformedResponse(text))?;
        debug!(
            flag_key,
            variant = resolved.variant.as_deref().unwrap_or(""),
            reason = resolved.reason.as_deref().unwrap_or(""),
            "flagd resolved flag"
        );

        match resolved.value {
            Some(value) => Ok(value),
            None => Ok(default_value.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// JSON parsing helpers
// ---------------------------------------------------------------------------

/// A successful ResolveString response.
#[derive(Debug, PartialEq)]
pub(crate) struct ResolvedString {
    /// `None` only for disabled flags, which resolve to the caller's default.
    pub value: Option<String>,
    pub variant: Option<String>,
    pub reason: Option<String>,
}

/// Parse a ResolveString response body.
///
/// Expected shape: `{ "value": "enhanced", "variant": "enhanced", "reason": "TARGETING_MATCH" }`.
/// The JSON codec omits zero-valued fields, so a flag resolving to `""`
/// arrives without `value`. Returns `None` when the body is not JSON, when
/// `value` is present but not a string, or when the reason is `ERROR` and no
/// value was sent.
pub(crate) fn parse_resolve_response(body: &str) -> Option<ResolvedString> {
    let v: Value = serde_json::from_str(body).ok()?;
    let reason = v.get("reason").and_then(Value::as_str).map(str::to_string);
    let variant = v.get("variant").and_then(Value::as_str).map(str::to_string);

    if reason.as_deref() == Some(REASON_DISABLED) {
        return Some(ResolvedString {
            value: None,
            variant,
            reason,
        });
    }

    let value = match v.get("value") {
        Some(value) => value.as_str()?.to_string(),
        None if reason.as_deref() == Some(REASON_ERROR) => return None,
        None => String::new(),
    };
    Some(ResolvedString {
        value: Some(value),
        variant,
        reason,
    })
}

/// Extract `(code, message)` from a Connect error body, falling back to
/// `"unknown"` and the raw body when the shape is unexpected.
pub(crate) fn parse_error_body(body: &str) -> (String, String) {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let code = field("code").unwrap_or_else(|| "unknown".to_string());
    let message = field("message").unwrap_or_else(|| body.trim().to_string());
    (code, message)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
