// Synthetic daily-step estimators.
//
// None of these model anything real: each draws a step count and derives
// calories (and for the richer variants stride, distance and intensity) from
// fixed constants. They are pure functions of the generator they are given.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::algorithm;
use crate::intensity::Intensity;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const SIMPLE_CALORIES_PER_STEP: f64 = 0.04;

/// Lower and exclusive upper bound of the base count for simple/enhanced.
pub const BASE_STEPS: (u32, u32) = (5000, 10000);
/// Base count bounds for the ml-powered estimator.
pub const ML_BASE_STEPS: (u32, u32) = (6000, 10000);
/// The ml-powered adjustment multiplier is drawn from `1.0 ± ML_ADJUSTMENT`.
pub const ML_ADJUSTMENT: f64 = 0.1;

pub const ENHANCED_STRIDE_M: (f64, f64) = (0.7, 1.0);
pub const ML_STRIDE_M: (f64, f64) = (0.75, 1.0);

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One day's estimate, returned as the response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEstimate {
    pub steps: u32,
    pub calories: u32,
    pub algorithm: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StepDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDetails {
    /// Metres per step.
    pub average_stride: f64,
    pub distance_km: f64,
    pub intensity: Intensity,
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// Count in [5000, 10000), calories at a flat 0.04 per step.
pub fn simple<R: Rng + ?Sized>(rng: &mut R) -> StepEstimate {
    let steps = rng.random_range(BASE_STEPS.0..BASE_STEPS.1);
    StepEstimate {
        steps,
        calories: calories_for(steps, SIMPLE_CALORIES_PER_STEP),
        algorithm: algorithm::SIMPLE.to_string(),
        details: None,
    }
}

/// Count in [5000, 10000) with a sampled stride and a coin-flip between
/// moderate and high intensity.
pub fn enhanced<R: Rng + ?Sized>(rng: &mut R) -> StepEstimate {
    let steps = rng.random_range(BASE_STEPS.0..BASE_STEPS.1);
    let stride = rng.random_range(ENHANCED_STRIDE_M.0..ENHANCED_STRIDE_M.1);
    let intensity = if rng.random_bool(0.5) {
        Intensity::Moderate
    } else {
        Intensity::High
    };

    StepEstimate {
        steps,
        calories: calories_for(steps, calories_per_step(intensity)),
        algorithm: algorithm::ENHANCED.to_string(),
        details: Some(StepDetails {
            average_stride: stride,
            distance_km: distance_km(steps, stride),
            intensity,
        }),
    }
}

/// Count in [6000, 10000) scaled by a ±10% adjustment. Intensity is
/// classified on the adjusted count, which is also what gets reported;
/// distance uses the unadjusted count.
pub fn ml_powered<R: Rng + ?Sized>(rng: &mut R) -> StepEstimate {
    let base = rng.random_range(ML_BASE_STEPS.0..ML_BASE_STEPS.1);
    let stride = rng.random_range(ML_STRIDE_M.0..ML_STRIDE_M.1);
    let adjustment = rng.random_range((1.0 - ML_ADJUSTMENT)..=(1.0 + ML_ADJUSTMENT));
    let steps = (f64::from(base) * adjustment).floor() as u32;
    let intensity = classify_intensity(steps);

    StepEstimate {
        steps,
        calories: calories_for(steps, calories_per_step(intensity)),
        algorithm: algorithm::ML_POWERED.to_string(),
        details: Some(StepDetails {
            average_stride: stride,
            distance_km: distance_km(base, stride),
            intensity,
        }),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fixed thresholds: < 5000 low, < 7500 moderate, < 10000 high.
pub fn classify_intensity(steps: u32) -> Intensity {
    match steps {
        0..=4999 => Intensity::Low,
        5000..=7499 => Intensity::Moderate,
        7500..=9999 => Intensity::High,
        _ => Intensity::VeryHigh,
    }
}

pub fn calories_per_step(intensity: Intensity) -> f64 {
    match intensity {
        Intensity::Low => 0.035,
        Intensity::Moderate => 0.045,
        Intensity::High => 0.060,
        Intensity::VeryHigh => 0.075,
    }
}

/// `floor(steps * multiplier)`.
pub fn calories_for(steps: u32, multiplier: f64) -> u32 {
    (f64::from(steps) * multiplier).floor() as u32
}

/// `steps * stride / 1000`, rounded to two decimals.
pub fn distance_km(steps: u32, stride: f64) -> f64 {
    round_2dp(f64::from(steps) * stride / 1000.0)
}

fn round_2dp(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLES: u64 = 2000;

    fn rngs() -> impl Iterator<Item = StdRng> {
        (0..SAMPLES).map(StdRng::seed_from_u64)
    }

    #[test]
    fn simple_stays_in_range_without_details() {
        for mut rng in rngs() {
            let e = simple(&mut rng);
            assert!((5000..10000).contains(&e.steps), "steps {}", e.steps);
            assert_eq!(e.calories, (f64::from(e.steps) * 0.04).floor() as u32);
            assert_eq!(e.algorithm, "simple");
            assert!(e.details.is_none());
        }
    }

    #[test]
    fn enhanced_details_are_consistent() {
        let mut seen = std::collections::HashSet::new();
        for mut rng in rngs() {
            let e = enhanced(&mut rng);
            let d = e.details.as_ref().expect("enhanced always has details");
            assert!((5000..10000).contains(&e.steps));
            assert!((0.7..1.0).contains(&d.average_stride), "stride {}", d.average_stride);
            assert_eq!(d.distance_km, distance_km(e.steps, d.average_stride));
            let multiplier = if d.intensity == Intensity::High { 0.06 } else { 0.045 };
            assert_eq!(e.calories, (f64::from(e.steps) * multiplier).floor() as u32);
            assert!(matches!(d.intensity, Intensity::Moderate | Intensity::High));
            assert_eq!(e.algorithm, "enhanced");
            seen.insert(d.intensity);
        }
        assert_eq!(seen.len(), 2, "both intensities should occur");
    }

    #[test]
    fn ml_powered_respects_envelope_and_thresholds() {
        for mut rng in rngs() {
            let e = ml_powered(&mut rng);
            let d = e.details.as_ref().expect("ml-powered always has details");
            assert!(e.steps >= 5400 && e.steps < 11000, "steps {}", e.steps);
            assert_eq!(d.intensity, classify_intensity(e.steps));
            assert_eq!(
                e.calories,
                (f64::from(e.steps) * calories_per_step(d.intensity)).floor() as u32
            );
            assert!((0.75..1.0).contains(&d.average_stride));
            assert!(d.distance_km > 0.0);
            assert_eq!(e.algorithm, "ml-powered");
        }
    }

    #[test]
    fn ml_powered_distance_uses_unadjusted_base() {
        for seed in 0..200 {
            let e = ml_powered(&mut StdRng::seed_from_u64(seed));

            // Replay the draws in the order the estimator makes them.
            let mut replay = StdRng::seed_from_u64(seed);
            let base: u32 = replay.random_range(ML_BASE_STEPS.0..ML_BASE_STEPS.1);
            let stride: f64 = replay.random_range(ML_STRIDE_M.0..ML_STRIDE_M.1);
            let adjustment: f64 =
                replay.random_range((1.0 - ML_ADJUSTMENT)..=(1.0 + ML_ADJUSTMENT));

            let d = e.details.as_ref().unwrap();
            assert_eq!(e.steps, (f64::from(base) * adjustment).floor() as u32);
            assert_eq!(d.average_stride, stride);
            assert_eq!(d.distance_km, distance_km(base, stride));
        }
    }

    #[test]
    fn same_seed_same_estimate() {
        let a = ml_powered(&mut StdRng::seed_from_u64(99));
        let b = ml_powered(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn intensity_thresholds() {
        assert_eq!(classify_intensity(0), Intensity::Low);
        assert_eq!(classify_intensity(4999), Intensity::Low);
        assert_eq!(classify_intensity(5000), Intensity::Moderate);
        assert_eq!(classify_intensity(7499), Intensity::Moderate);
        assert_eq!(classify_intensity(7500), Intensity::High);
        assert_eq!(classify_intensity(9999), Intensity::High);
        assert_eq!(classify_intensity(10000), Intensity::VeryHigh);
        assert_eq!(classify_intensity(u32::MAX), Intensity::VeryHigh);
    }

    #[test]
    fn distance_rounds_to_two_decimals() {
        assert_eq!(distance_km(8000, 0.75), 6.0);
        assert_eq!(distance_km(7777, 0.8123), 6.32);
        assert_eq!(distance_km(5000, 0.9), 4.5);
    }

    #[test]
    fn calories_truncate() {
        assert_eq!(calories_for(5001, 0.04), 200);
        assert_eq!(calories_for(9999, 0.075), 749);
        assert_eq!(calories_for(0, 0.06), 0);
    }

    #[test]
    fn serializes_with_camel_case_details() {
        let e = StepEstimate {
            steps: 8000,
            calories: 480,
            algorithm: "enhanced".into(),
            details: Some(StepDetails {
                average_stride: 0.75,
                distance_km: 6.0,
                intensity: Intensity::High,
            }),
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "steps": 8000,
                "calories": 480,
                "algorithm": "enhanced",
                "details": { "averageStride": 0.75, "distanceKm": 6.0, "intensity": "high" }
            })
        );
    }

    #[test]
    fn details_omitted_when_absent() {
        let e = StepEstimate {
            steps: 6000,
            calories: 240,
            algorithm: "simple".into(),
            details: None,
        };
        let v = serde_json::to_value(&e).unwrap();
        assert!(v.get("details").is_none());
    }
}
