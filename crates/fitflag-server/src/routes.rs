// warp filters for the steps, calories and health endpoints.

use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use fitflag_core::calories::CaloriesService;
use fitflag_core::config::Config;
use fitflag_core::flags::FlagEvaluator;
use fitflag_core::random::RandomSource;
use fitflag_core::steps::StepsService;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_USER_ID: &str = "user123";
pub const DEFAULT_ROLE: &str = "user";
pub const SERVICE_NAME: &str = "fitflag";

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything a request handler needs. Built once at startup.
pub struct AppState {
    pub steps: StepsService,
    pub calories: CaloriesService,
}

impl AppState {
    /// Both services share the one evaluator and random source.
    pub fn from_config(
        config: &Config,
        evaluator: Arc<dyn FlagEvaluator>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            steps: StepsService::from_config(config, evaluator.clone(), random.clone()),
            calories: CaloriesService::from_config(config, evaluator, random),
        }
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// `?userId=..&role=..`. Missing or empty values take the defaults; when a
/// key is repeated the first occurrence wins.
#[derive(Debug, Default)]
pub struct UserQuery {
    pub user_id: Option<String>,
    pub role: Option<String>,
}

impl UserQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = UserQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "userId" => &mut query.user_id,
                "role" => &mut query.role,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    pub fn user_id(&self) -> &str {
        non_empty_or(self.user_id.as_deref(), DEFAULT_USER_ID)
    }

    pub fn role(&self) -> &str {
        non_empty_or(self.role.as_deref(), DEFAULT_ROLE)
    }
}

fn non_empty_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// All routes, with CORS for browser dashboards and request tracing.
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let cors = warp::cors().allow_any_origin().allow_methods(vec!["GET"]);

    daily_steps(state.clone())
        .or(steps_health())
        .or(daily_calories(state))
        .or(service_health())
        .with(cors)
        .with(warp::trace::request())
}

/// Query parameters as a [`UserQuery`]. Decoding into raw pairs accepts any
/// query string, including repeated keys.
fn user_query() -> impl Filter<Extract = (UserQuery,), Error = Rejection> + Clone {
    warp::query::<Vec<(String, String)>>().map(UserQuery::from_pairs)
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// GET /api/steps/daily
fn daily_steps(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "steps" / "daily")
        .and(warp::get())
        .and(user_query())
        .and(with_state(state))
        .and_then(handle_daily_steps)
}

/// GET /api/steps/health
fn steps_health() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "steps" / "health")
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "status": "healthy" })))
}

/// GET /api/calories/daily
fn daily_calories(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "calories" / "daily")
        .and(warp::get())
        .and(user_query())
        .and(with_state(state))
        .and_then(handle_daily_calories)
}

/// GET /api/calories/health and GET /health
fn service_health() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "calories" / "health")
        .or(warp::path!("health"))
        .unify()
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "status": "healthy", "service": SERVICE_NAME })))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_daily_steps(
    query: UserQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Infallible> {
    let estimate = state.steps.daily_steps(query.user_id(), query.role()).await;
    Ok(warp::reply::json(&estimate))
}

async fn handle_daily_calories(
    query: UserQuery,
    state: Arc<AppState>,
) -> Result<impl Reply, Infallible> {
    let estimate = state
        .calories
        .daily_calories(query.user_id(), query.role())
        .await;
    Ok(warp::reply::json(&estimate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitflag_core::flags::FlagClient;
    use fitflag_core::random::SeededRandom;

    #[test]
    fn state_wires_flag_keys_and_defaults_from_config() {
        let mut config = Config::default();
        config.flags.steps_key = "steps-v2".into();
        config.flags.calories_default = "enhanced".into();
        let state = AppState::from_config(
            &config,
            Arc::new(FlagClient::Disabled),
            Arc::new(SeededRandom::new(0)),
        );

        assert_eq!(state.steps.dispatcher().flag_key(), "steps-v2");
        assert_eq!(state.steps.dispatcher().default_variant(), "simple");
        assert_eq!(
            state.calories.dispatcher().flag_key(),
            "calorie-calculation-algorithm"
        );
        assert_eq!(state.calories.dispatcher().default_variant(), "enhanced");
    }

    #[test]
    fn missing_query_values_use_defaults() {
        let q = UserQuery::default();
        assert_eq!(q.user_id(), "user123");
        assert_eq!(q.role(), "user");
    }

    #[test]
    fn empty_query_values_use_defaults() {
        let q = UserQuery {
            user_id: Some(String::new()),
            role: Some(String::new()),
        };
        assert_eq!(q.user_id(), "user123");
        assert_eq!(q.role(), "user");
    }

    #[test]
    fn repeated_keys_keep_first_value() {
        let pairs = vec![
            ("userId".to_string(), "a".to_string()),
            ("role".to_string(), "admin".to_string()),
            ("userId".to_string(), "b".to_string()),
            ("extra".to_string(), "1".to_string()),
        ];
        let q = UserQuery::from_pairs(pairs);
        assert_eq!(q.user_id(), "a");
        assert_eq!(q.role(), "admin");
    }

    #[test]
    fn provided_query_values_are_kept() {
        let q = UserQuery {
            user_id: Some("alice".into()),
            role: Some("admin".into()),
        };
        assert_eq!(q.user_id(), "alice");
        assert_eq!(q.role(), "admin");
    }
}
