//! Standing-policy configuration loaded from the environment.
//!
//! Deployments can override the canonical weighting and elimination
//! thresholds; invalid overrides are rejected at startup rather than
//! silently replaced.

use std::env;

use educore_standing::{AveragingWeights, EliminationThresholds, StandingConfig};

/// Build the standing configuration from the environment, falling back to
/// the crate defaults (0.4/0.6 weighting, > 3 absences, average < 10.0).
///
/// # Panics
///
/// Panics when an override is present but invalid (weights not summing to
/// 1.0, threshold out of the grading scale). A service running with a
/// half-applied policy would be worse than one that refuses to start.
pub fn standing_config_from_env() -> StandingConfig {
    let weights = match (
        env_f64("STANDING_TP_WEIGHT"),
        env_f64("STANDING_EXAM_WEIGHT"),
    ) {
        (Some(tp), Some(exam)) => {
            AveragingWeights::new(tp, exam).expect("invalid STANDING_*_WEIGHT configuration")
        }
        (None, None) => AveragingWeights::default(),
        _ => panic!("STANDING_TP_WEIGHT and STANDING_EXAM_WEIGHT must be set together"),
    };

    let defaults = EliminationThresholds::default();
    let max_absences = env::var("STANDING_MAX_ABSENCES")
        .ok()
        .map(|v| v.parse().expect("invalid STANDING_MAX_ABSENCES"))
        .unwrap_or(defaults.max_absences);
    let min_average = env_f64("STANDING_MIN_AVERAGE").unwrap_or(defaults.min_average);

    let thresholds = EliminationThresholds::new(max_absences, min_average)
        .expect("invalid STANDING_MIN_AVERAGE configuration");

    StandingConfig {
        weights,
        thresholds,
    }
}

fn env_f64(key: &str) -> Option<f64> {
    env::var(key)
        .ok()
        .map(|v| v.parse().unwrap_or_else(|_| panic!("invalid {key}")))
}
