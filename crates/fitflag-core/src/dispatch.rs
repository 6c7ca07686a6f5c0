// Flag-driven strategy dispatch.
//
// A dispatcher owns one flag key. Per request it asks the shared evaluator
// for the flag's string value, parses it into a closed variant enum, and
// hands the variant to a handler. Resolution never fails: provider errors
// and timeouts both collapse to the configured default variant.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::flags::{EvaluationContext, FlagError, FlagEvaluator};

/// Upper bound on a single flag evaluation unless overridden.
pub const DEFAULT_EVALUATION_TIMEOUT: Duration = Duration::from_millis(500);

/// A closed set of behaviours selectable by a string flag.
///
/// Parsing is total: every string maps to exactly one variant, with
/// unrecognized values landing in whatever catch-all the enum defines.
pub trait Variant: Sized {
    fn from_flag_value(value: &str) -> Self;
}

pub struct FlagDrivenDispatcher {
    evaluator: Arc<dyn FlagEvaluator>,
    flag_key: String,
    default_variant: String,
    timeout: Duration,
}

impl FlagDrivenDispatcher {
    pub fn new(
        evaluator: Arc<dyn FlagEvaluator>,
        flag_key: impl Into<String>,
        default_variant: impl Into<String>,
    ) -> Self {
        Self {
            evaluator,
            flag_key: flag_key.into(),
            default_variant: default_variant.into(),
            timeout: DEFAULT_EVALUATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn flag_key(&self) -> &str {
        &self.flag_key
    }

    pub fn default_variant(&self) -> &str {
        &self.default_variant
    }

    /// The flag's raw string value for `context`, or the default variant if
    /// the evaluator errors or does not answer within the timeout.
    pub async fn resolve(&self, context: &EvaluationContext) -> String {
        let evaluation = self
            .evaluator
            .evaluate_string(&self.flag_key, &self.default_variant, context);

        let result = match tokio::time::timeout(self.timeout, evaluation).await {
            Ok(result) => result,
            Err(_) => Err(FlagError::Timeout(self.timeout)),
        };

        match result {
            Ok(value) => {
                debug!(flag_key = %self.flag_key, value = %value, "flag evaluated");
                value
            }
            Err(e) => {
                warn!(
                    flag_key = %self.flag_key,
                    default_variant = %self.default_variant,
                    "flag evaluation failed, using default: {e}"
                );
                self.default_variant.clone()
            }
        }
    }

    /// Resolve and parse the flag into a variant.
    pub async fn select<V: Variant>(&self, context: &EvaluationContext) -> V {
        V::from_flag_value(&self.resolve(context).await)
    }

    /// Resolve the flag and run `handle` with the selected variant.
    pub async fn dispatch<V, T, F>(&self, context: &EvaluationContext, handle: F) -> T
    where
        V: Variant,
        F: FnOnce(V) -> T,
    {
        handle(self.select(context).await)
    }
}
