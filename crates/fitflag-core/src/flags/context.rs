// Per-request evaluation context handed to the flag provider.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attribute key carrying the requesting user's id.
pub const USER_ID_KEY: &str = "userId";
/// Attribute key carrying the requesting user's role.
pub const ROLE_KEY: &str = "role";
/// Key under which the targeting key travels in a provider request.
pub const TARGETING_KEY: &str = "targetingKey";

/// String attributes describing the requester, plus an optional targeting
/// key used by the provider for percentage rollouts.
///
/// Built once per request with the consuming `with_*` methods and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationContext {
    targeting_key: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a user/role pair. The user id doubles as the targeting
    /// key so rollouts stay sticky per user.
    pub fn for_user(user_id: &str, role: &str) -> Self {
        Self::new()
            .with_targeting_key(user_id)
            .with(USER_ID_KEY, user_id)
            .with(ROLE_KEY, role)
    }

    pub fn with_targeting_key(mut self, key: impl Into<String>) -> Self {
        self.targeting_key = Some(key.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn targeting_key(&self) -> Option<&str> {
        self.targeting_key.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Flat JSON object in the shape flagd expects for `context`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (k, v) in self.attributes() {
            map.insert(k.to_string(), Value::String(v.to_string()));
        }
        if let Some(key) = &self.targeting_key {
            map.insert(TARGETING_KEY.to_string(), Value::String(key.clone()));
        }
        Value::Object(map)
    }
}
