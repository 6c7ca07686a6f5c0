// Synthetic daily calorie estimators, keyed on activity minutes and a
// randomly chosen activity type.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::algorithm;
use crate::intensity::Intensity;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SIMPLE_CALORIES_PER_MINUTE: u32 = 5;

/// Inclusive activity-minute bounds for simple/enhanced.
pub const ACTIVITY_MINUTES: (u32, u32) = (30, 90);
/// Inclusive base-minute bounds for ml-powered.
pub const ML_BASE_MINUTES: (u32, u32) = (40, 100);
/// The ml-powered adjustment multiplier is drawn from `1.0 ± ML_ADJUSTMENT`.
pub const ML_ADJUSTMENT: f64 = 0.15;
/// Upper (exclusive) bound of the jitter added to ml-powered burn rates.
pub const ML_RATE_JITTER: f64 = 0.5;

// ---------------------------------------------------------------------------
// ActivityType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Running,
    Cycling,
    Swimming,
    Walking,
    Yoga,
    Weights,
}

impl ActivityType {
    pub const ALL: [ActivityType; 6] = [
        ActivityType::Running,
        ActivityType::Cycling,
        ActivityType::Swimming,
        ActivityType::Walking,
        ActivityType::Yoga,
        ActivityType::Weights,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityType::Running => 1.3,
            ActivityType::Cycling => 1.2,
            ActivityType::Swimming => 1.4,
            ActivityType::Walking => 0.8,
            ActivityType::Yoga => 0.7,
            ActivityType::Weights => 1.1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::Running => "running",
            ActivityType::Cycling => "cycling",
            ActivityType::Swimming => "swimming",
            ActivityType::Walking => "walking",
            ActivityType::Yoga => "yoga",
            ActivityType::Weights => "weights",
        }
    }

    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieEstimate {
    pub calories: u32,
    pub activity_minutes: u32,
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CalorieDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalorieDetails {
    pub intensity_level: Intensity,
    /// Calories per minute before the activity multiplier.
    pub burn_rate: f64,
    pub activity_type: ActivityType,
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// 30–90 minutes at a flat 5 calories per minute.
pub fn simple<R: Rng + ?Sized>(rng: &mut R) -> CalorieEstimate {
    let minutes = rng.random_range(ACTIVITY_MINUTES.0..=ACTIVITY_MINUTES.1);
    CalorieEstimate {
        calories: minutes * SIMPLE_CALORIES_PER_MINUTE,
        activity_minutes: minutes,
        algorithm: algorithm::SIMPLE.to_string(),
        details: None,
    }
}

pub fn enhanced<R: Rng + ?Sized>(rng: &mut R) -> CalorieEstimate {
    let minutes = rng.random_range(ACTIVITY_MINUTES.0..=ACTIVITY_MINUTES.1);
    let intensity = if rng.random_bool(0.5) {
        Intensity::Moderate
    } else {
        Intensity::High
    };
    let activity = ActivityType::sample(rng);
    let rate = base_burn_rate(intensity);

    CalorieEstimate {
        calories: calories_for(minutes, rate, activity),
        activity_minutes: minutes,
        algorithm: algorithm::ENHANCED.to_string(),
        details: Some(CalorieDetails {
            intensity_level: intensity,
            burn_rate: rate,
            activity_type: activity,
        }),
    }
}

/// Base minutes scaled by ±15%, intensity classified on the adjusted
/// minutes, and a small random bump on the burn rate.
pub fn ml_powered<R: Rng + ?Sized>(rng: &mut R) -> CalorieEstimate {
    let base = rng.random_range(ML_BASE_MINUTES.0..=ML_BASE_MINUTES.1);
    let activity = ActivityType::sample(rng);
    let adjustment = rng.random_range((1.0 - ML_ADJUSTMENT)..=(1.0 + ML_ADJUSTMENT));
    let minutes = (f64::from(base) * adjustment).round() as u32;
    let intensity = classify_intensity(minutes);
    let rate = base_burn_rate(intensity) + rng.random_range(0.0..ML_RATE_JITTER);

    CalorieEstimate {
        calories: calories_for(minutes, rate, activity),
        activity_minutes: minutes,
        algorithm: algorithm::ML_POWERED.to_string(),
        details: Some(CalorieDetails {
            intensity_level: intensity,
            burn_rate: rate,
            activity_type: activity,
        }),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fixed thresholds on minutes: < 40 low, < 60 moderate, < 80 high.
pub fn classify_intensity(minutes: u32) -> Intensity {
    match minutes {
        0..=39 => Intensity::Low,
        40..=59 => Intensity::Moderate,
        60..=79 => Intensity::High,
        _ => Intensity::VeryHigh,
    }
}

pub fn base_burn_rate(intensity: Intensity) -> f64 {
    match intensity {
        Intensity::Low => 4.0,
        Intensity::Moderate => 6.0,
        Intensity::High => 8.0,
        Intensity::VeryHigh => 10.0,
    }
}

/// `round(minutes * rate * activity multiplier)`.
pub fn calories_for(minutes: u32, rate: f64, activity: ActivityType) -> u32 {
    (f64::from(minutes) * rate * activity.multiplier()).round() as u32
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
