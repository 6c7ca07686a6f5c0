// Daily step estimation behind the `step-calculation-algorithm` flag.

pub mod estimate;

use std::sync::Arc;
use tracing::info;

use crate::algorithm;
use crate::config::Config;
use crate::dispatch::{FlagDrivenDispatcher, Variant};
use crate::flags::{EvaluationContext, FlagEvaluator};
use crate::random::RandomSource;

pub use estimate::{StepDetails, StepEstimate};

// ---------------------------------------------------------------------------
// StepAlgorithm
// ---------------------------------------------------------------------------

/// Variants of the step flag. Anything unrecognized, including differently
/// cased spellings of known names, is `Unknown` and is served by the
/// ml-powered estimator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAlgorithm {
    Simple,
    Enhanced,
    MlPowered,
    Unknown(String),
}

impl Variant for StepAlgorithm {
    fn from_flag_value(value: &str) -> Self {
        match value {
            algorithm::SIMPLE => StepAlgorithm::Simple,
            algorithm::ENHANCED => StepAlgorithm::Enhanced,
            algorithm::ML_POWERED => StepAlgorithm::MlPowered,
            other => StepAlgorithm::Unknown(other.to_string()),
        }
    }
}

impl StepAlgorithm {
    /// Run the estimator this variant selects.
    pub fn estimate<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> StepEstimate {
        match self {
            StepAlgorithm::Simple => estimate::simple(rng),
            StepAlgorithm::Enhanced => estimate::enhanced(rng),
            StepAlgorithm::MlPowered | StepAlgorithm::Unknown(_) => estimate::ml_powered(rng),
        }
    }
}

// ---------------------------------------------------------------------------
// StepsService
// ---------------------------------------------------------------------------

pub struct StepsService {
    dispatcher: FlagDrivenDispatcher,
    random: Arc<dyn RandomSource>,
}

impl StepsService {
    pub fn new(dispatcher: FlagDrivenDispatcher, random: Arc<dyn RandomSource>) -> Self {
        Self { dispatcher, random }
    }

    /// Wire a service from the `[flags]` and `[flagd]` config sections.
    pub fn from_config(
        config: &Config,
        evaluator: Arc<dyn FlagEvaluator>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let dispatcher = FlagDrivenDispatcher::new(
            evaluator,
            config.flags.steps_key.clone(),
            config.flags.steps_default.clone(),
        )
        .with_timeout(config.flagd.timeout());
        Self::new(dispatcher, random)
    }

    pub fn dispatcher(&self) -> &FlagDrivenDispatcher {
        &self.dispatcher
    }

    /// Estimate today's steps for `user_id`/`role`, using whichever
    /// algorithm the flag selects for them.
    pub async fn daily_steps(&self, user_id: &str, role: &str) -> StepEstimate {
        let context = EvaluationContext::for_user(user_id, role);
        self.dispatcher
            .dispatch(&context, |algorithm: StepAlgorithm| {
                info!(user_id, role, ?algorithm, "estimating daily steps");
                let mut rng = self.random.generator();
                algorithm.estimate(&mut rng)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FlagError;
    use crate::random::SeededRandom;
    use async_trait::async_trait;

    struct FixedEvaluator(Result<&'static str, ()>);

    #[async_trait]
    impl FlagEvaluator for FixedEvaluator {
        async fn evaluate_string(
            &self,
            _flag_key: &str,
            _default_value: &str,
            _context: &EvaluationContext,
        ) -> Result<String, FlagError> {
            self.0
                .map(str::to_string)
                .map_err(|_| FlagError::MalformedResponse("boom".into()))
        }
    }

    fn service(answer: Result<&'static str, ()>) -> StepsService {
        StepsService::from_config(
            &Config::default(),
            Arc::new(FixedEvaluator(answer)),
            Arc::new(SeededRandom::new(1)),
        )
    }

    #[test]
    fn parses_known_variants_exactly() {
        assert_eq!(StepAlgorithm::from_flag_value("simple"), StepAlgorithm::Simple);
        assert_eq!(StepAlgorithm::from_flag_value("enhanced"), StepAlgorithm::Enhanced);
        assert_eq!(
            StepAlgorithm::from_flag_value("ml-powered"),
            StepAlgorithm::MlPowered
        );
        for raw in ["", "Simple", "ENHANCED", "ml_powered", "quantum"] {
            assert_eq!(
                StepAlgorithm::from_flag_value(raw),
                StepAlgorithm::Unknown(raw.to_string())
            );
        }
    }

    #[tokio::test]
    async fn each_variant_routes_to_its_estimator() {
        assert_eq!(service(Ok("simple")).daily_steps("u", "user").await.algorithm, "simple");
        assert_eq!(
            service(Ok("enhanced")).daily_steps("u", "user").await.algorithm,
            "enhanced"
        );
        assert_eq!(
            service(Ok("ml-powered")).daily_steps("u", "user").await.algorithm,
            "ml-powered"
        );
    }

    #[tokio::test]
    async fn unknown_variant_uses_ml_powered() {
        for raw in ["", "Enhanced", "garbage"] {
            let estimate = service(Ok(raw)).daily_steps("u", "user").await;
            assert_eq!(estimate.algorithm, "ml-powered", "variant {raw:?}");
            assert!(estimate.details.is_some());
        }
    }

    #[tokio::test]
    async fn evaluator_failure_matches_default_answer() {
        // Same seed on both sides, so the estimates are identical.
        let failed = service(Err(())).daily_steps("u", "user").await;
        let defaulted = service(Ok("simple")).daily_steps("u", "user").await;
        assert_eq!(failed, defaulted);
        assert_eq!(failed.algorithm, "simple");
    }

    #[tokio::test]
    async fn configured_default_applies_on_failure() {
        let mut config = Config::default();
        config.flags.steps_default = "enhanced".into();
        let svc = StepsService::from_config(
            &config,
            Arc::new(FixedEvaluator(Err(()))),
            Arc::new(SeededRandom::new(3)),
        );
        assert_eq!(svc.daily_steps("u", "user").await.algorithm, "enhanced");
    }
}
