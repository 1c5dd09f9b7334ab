//! Policy configuration for the standing engine.
//!
//! Historically the weighting and elimination constants were inlined at each
//! call site, which let them drift apart. They are now named configuration
//! injected once at construction; call sites cannot supply their own ad-hoc
//! numbers.

use thiserror::Error;

/// Weighting applied to the TP (coursework) and exam components of an
/// average. The two weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AveragingWeights {
    tp: f64,
    exam: f64,
}

/// Error raised when a policy configuration value is out of range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("averaging weights must each lie in [0, 1], got tp={tp}, exam={exam}")]
    WeightOutOfRange { tp: f64, exam: f64 },
    #[error("averaging weights must sum to 1.0, got {sum}")]
    WeightsDoNotSumToOne { sum: f64 },
    #[error("minimum average must lie in [0, 20], got {0}")]
    MinAverageOutOfRange(f64),
}

impl AveragingWeights {
    const EPSILON: f64 = 1e-9;

    /// Build a weight pair, enforcing that both weights are in [0, 1] and
    /// sum to 1.0.
    pub fn new(tp: f64, exam: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&tp) || !(0.0..=1.0).contains(&exam) {
            return Err(ConfigError::WeightOutOfRange { tp, exam });
        }
        let sum = tp + exam;
        if (sum - 1.0).abs() > Self::EPSILON {
            return Err(ConfigError::WeightsDoNotSumToOne { sum });
        }
        Ok(Self { tp, exam })
    }

    pub fn tp(&self) -> f64 {
        self.tp
    }

    pub fn exam(&self) -> f64 {
        self.exam
    }
}

impl Default for AveragingWeights {
    /// Canonical weighting: 40% coursework, 60% exam.
    fn default() -> Self {
        Self { tp: 0.4, exam: 0.6 }
    }
}

/// Thresholds past which a grade record is eliminated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EliminationThresholds {
    /// Strictly more unjustified absences than this eliminates.
    pub max_absences: u32,
    /// An average strictly below this eliminates.
    pub min_average: f64,
}

impl EliminationThresholds {
    pub fn new(max_absences: u32, min_average: f64) -> Result<Self, ConfigError> {
        if !(0.0..=20.0).contains(&min_average) {
            return Err(ConfigError::MinAverageOutOfRange(min_average));
        }
        Ok(Self {
            max_absences,
            min_average,
        })
    }
}

impl Default for EliminationThresholds {
    fn default() -> Self {
        Self {
            max_absences: 3,
            min_average: 10.0,
        }
    }
}

/// Complete policy configuration for the standing engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StandingConfig {
    pub weights: AveragingWeights,
    pub thresholds: EliminationThresholds,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_canonical() {
        let weights = AveragingWeights::default();
        assert_eq!(weights.tp(), 0.4);
        assert_eq!(weights.exam(), 0.6);
    }

    #[test]
    fn weights_must_sum_to_one() {
        assert!(AveragingWeights::new(0.3, 0.7).is_ok());
        assert!(AveragingWeights::new(0.5, 0.5).is_ok());
        assert_eq!(
            AveragingWeights::new(0.4, 0.5),
            Err(ConfigError::WeightsDoNotSumToOne { sum: 0.9 })
        );
    }

    #[test]
    fn weights_must_be_in_unit_interval() {
        assert!(matches!(
            AveragingWeights::new(-0.2, 1.2),
            Err(ConfigError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn default_thresholds() {
        let thresholds = EliminationThresholds::default();
        assert_eq!(thresholds.max_absences, 3);
        assert_eq!(thresholds.min_average, 10.0);
    }

    #[test]
    fn min_average_bounded_by_grading_scale() {
        assert!(EliminationThresholds::new(5, 21.0).is_err());
        assert!(EliminationThresholds::new(5, 8.0).is_ok());
    }
}
