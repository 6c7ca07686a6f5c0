// Daily calorie estimation behind the `calorie-calculation-algorithm` flag.

pub mod estimate;

use std::sync::Arc;
use tracing::info;

use crate::algorithm;
use crate::config::Config;
use crate::dispatch::{FlagDrivenDispatcher, Variant};
use crate::flags::{EvaluationContext, FlagEvaluator};
use crate::random::RandomSource;

pub use estimate::{ActivityType, CalorieDetails, CalorieEstimate};

/// Variants of the calorie flag. Unlike steps, unrecognized values are
/// served by the simple estimator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalorieAlgorithm {
    Simple,
    Enhanced,
    MlPowered,
    Unknown(String),
}

impl Variant for CalorieAlgorithm {
    fn from_flag_value(value: &str) -> Self {
        match value {
            algorithm::SIMPLE => CalorieAlgorithm::Simple,
            algorithm::ENHANCED => CalorieAlgorithm::Enhanced,
            algorithm::ML_POWERED => CalorieAlgorithm::MlPowered,
            other => CalorieAlgorithm::Unknown(other.to_string()),
        }
    }
}

impl CalorieAlgorithm {
    pub fn estimate<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> CalorieEstimate {
        match self {
            CalorieAlgorithm::Enhanced => estimate::enhanced(rng),
            CalorieAlgorithm::MlPowered => estimate::ml_powered(rng),
            CalorieAlgorithm::Simple | CalorieAlgorithm::Unknown(_) => estimate::simple(rng),
        }
    }
}

pub struct CaloriesService {
    dispatcher: FlagDrivenDispatcher,
    random: Arc<dyn RandomSource>,
}

impl CaloriesService {
    pub fn new(dispatcher: FlagDrivenDispatcher, random: Arc<dyn RandomSource>) -> Self {
        Self { dispatcher, random }
    }

    pub fn from_config(
        config: &Config,
        evaluator: Arc<dyn FlagEvaluator>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let dispatcher = FlagDrivenDispatcher::new(
            evaluator,
            config.flags.calories_key.clone(),
            config.flags.calories_default.clone(),
        )
        .with_timeout(config.flagd.timeout());
        Self::new(dispatcher, random)
    }

    pub fn dispatcher(&self) -> &FlagDrivenDispatcher {
        &self.dispatcher
    }

    pub async fn daily_calories(&self, user_id: &str, role: &str) -> CalorieEstimate {
        let context = EvaluationContext::for_user(user_id, role);
        self.dispatcher
            .dispatch(&context, |algorithm: CalorieAlgorithm| {
                info!(user_id, role, ?algorithm, "estimating daily calories");
                let mut rng = self.random.generator();
                algorithm.estimate(&mut rng)
            })
            .await
    }
}
