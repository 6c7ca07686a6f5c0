// Library root: flag evaluation, flag-driven dispatch, and the synthetic
// step/calorie estimators served by the HTTP layer.

pub mod algorithm;
pub mod calories;
pub mod config;
pub mod dispatch;
pub mod flags;
pub mod intensity;
pub mod random;
pub mod steps;
