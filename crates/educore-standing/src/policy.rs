//! Pure standing policies: averaging and per-course elimination.
//!
//! Both functions are side-effect free. Score range validation happens in
//! the service before these are reached.

use crate::config::{AveragingWeights, EliminationThresholds};

/// Weighted average of the TP and exam components.
pub fn weighted_average(tp: f64, exam: f64, weights: &AveragingWeights) -> f64 {
    tp * weights.tp() + exam * weights.exam()
}

/// Per-course elimination decision.
///
/// A record is eliminated when the unjustified absence count exceeds
/// `max_absences` or the average falls below `min_average`.
pub fn is_eliminated(average: f64, absence_count: u32, thresholds: &EliminationThresholds) -> bool {
    absence_count > thresholds.max_absences || average < thresholds.min_average
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_thresholds() -> EliminationThresholds {
        EliminationThresholds::default()
    }

    #[test]
    fn average_is_linear_in_both_components() {
        let weights = AveragingWeights::default();
        assert_eq!(weighted_average(12.0, 8.0, &weights), 12.0 * 0.4 + 8.0 * 0.6);
        assert_eq!(weighted_average(0.0, 0.0, &weights), 0.0);
        assert_eq!(weighted_average(20.0, 20.0, &weights), 20.0);
    }

    #[test]
    fn average_respects_configured_weights() {
        let weights = AveragingWeights::new(0.3, 0.7).unwrap();
        let avg = weighted_average(10.0, 16.0, &weights);
        assert!((avg - (3.0 + 11.2)).abs() < 1e-9);
    }

    #[test]
    fn eliminated_when_absences_exceed_threshold() {
        // 4 unjustified absences against a limit of 3: eliminated no matter
        // how good the average is.
        assert!(is_eliminated(18.0, 4, &default_thresholds()));
    }

    #[test]
    fn eliminated_when_average_below_threshold() {
        assert!(is_eliminated(9.6, 0, &default_thresholds()));
    }

    #[test]
    fn not_eliminated_at_exact_boundaries() {
        // Exactly 3 absences and exactly a 10.0 average both pass.
        assert!(!is_eliminated(10.0, 3, &default_thresholds()));
    }

    #[test]
    fn monotonic_in_absences() {
        let thresholds = default_thresholds();
        let mut last = false;
        for count in 0..10 {
            let now = is_eliminated(15.0, count, &thresholds);
            // Once eliminated by absences, more absences never un-eliminate.
            assert!(!last || now);
            last = now;
        }
    }

    #[test]
    fn monotonic_in_average() {
        let thresholds = default_thresholds();
        let mut last = false;
        for step in 0..=40 {
            let average = 20.0 - f64::from(step) * 0.5;
            let now = is_eliminated(average, 0, &thresholds);
            // A lower average never un-eliminates.
            assert!(!last || now);
            last = now;
        }
    }

    #[test]
    fn custom_thresholds_are_honored() {
        let lenient = EliminationThresholds::new(5, 8.0).unwrap();
        assert!(!is_eliminated(9.0, 5, &lenient));
        assert!(is_eliminated(9.0, 6, &lenient));
        assert!(is_eliminated(7.9, 0, &lenient));
    }
}
