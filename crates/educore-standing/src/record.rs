//! The per-(student, course) grade record.

use serde::{Deserialize, Serialize};

use crate::config::StandingConfig;
use crate::policy;

/// Grade record for one (student, course) pair.
///
/// `average` and `eliminated` are derived values. The fields are private and
/// every mutator runs the recomputation, so a record can never hold an
/// average inconsistent with its scores. The elimination flag is the
/// outcome of the policy at the last mutation; an untouched record keeps
/// its persisted flag until the next score or absence event re-evaluates
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    tp_score: f64,
    exam_score: f64,
    average: f64,
    absence_count: u32,
    eliminated: bool,
}

impl GradeRecord {
    /// Fresh record for a newly associated (student, course) pair.
    ///
    /// Scores and absences start at zero. A zero average is below any
    /// realistic `min_average`, but a brand-new record has not been graded
    /// yet, so it starts out not eliminated; the first recorded score or
    /// absence runs the policy.
    pub fn new() -> Self {
        Self {
            tp_score: 0.0,
            exam_score: 0.0,
            average: 0.0,
            absence_count: 0,
            eliminated: false,
        }
    }

    /// Hydrate a record from persisted state.
    ///
    /// The average is recomputed from the scores rather than trusted, so a
    /// stale stored value cannot survive a load. The elimination flag is
    /// taken as persisted: it is the result of the last policy evaluation,
    /// and a record that has never been graded or marked absent must not
    /// become eliminated just by being read.
    pub fn from_parts(
        tp_score: f64,
        exam_score: f64,
        absence_count: u32,
        eliminated: bool,
        config: &StandingConfig,
    ) -> Self {
        Self {
            tp_score,
            exam_score,
            average: policy::weighted_average(tp_score, exam_score, &config.weights),
            absence_count,
            eliminated,
        }
    }

    pub fn tp_score(&self) -> f64 {
        self.tp_score
    }

    pub fn exam_score(&self) -> f64 {
        self.exam_score
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn absence_count(&self) -> u32 {
        self.absence_count
    }

    pub fn eliminated(&self) -> bool {
        self.eliminated
    }

    /// Set the TP score and rerun the derivation chain.
    pub fn record_tp(&mut self, score: f64, config: &StandingConfig) {
        self.tp_score = score;
        self.recompute(config);
    }

    /// Set the exam score and rerun the derivation chain.
    pub fn record_exam(&mut self, score: f64, config: &StandingConfig) {
        self.exam_score = score;
        self.recompute(config);
    }

    /// Replace the unjustified absence count and rerun the derivation chain.
    ///
    /// The count is always a full recount supplied by the caller, never an
    /// increment, so concurrent edits cannot make it drift.
    pub fn set_absence_count(&mut self, count: u32, config: &StandingConfig) {
        self.absence_count = count;
        self.recompute(config);
    }

    fn recompute(&mut self, config: &StandingConfig) {
        self.average = policy::weighted_average(self.tp_score, self.exam_score, &config.weights);
        self.eliminated =
            policy::is_eliminated(self.average, self.absence_count, &config.thresholds);
    }
}

impl Default for GradeRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_starts_clean() {
        let record = GradeRecord::new();
        assert_eq!(record.tp_score(), 0.0);
        assert_eq!(record.exam_score(), 0.0);
        assert_eq!(record.average(), 0.0);
        assert_eq!(record.absence_count(), 0);
        assert!(!record.eliminated());
    }

    #[test]
    fn recording_scores_derives_average_and_flag() {
        let config = StandingConfig::default();
        let mut record = GradeRecord::new();

        record.record_tp(12.0, &config);
        record.record_exam(8.0, &config);

        assert!((record.average() - 9.6).abs() < 1e-9);
        assert!(record.eliminated());

        record.record_exam(12.0, &config);
        assert!((record.average() - 12.0).abs() < 1e-9);
        assert!(!record.eliminated());
    }

    #[test]
    fn recording_same_score_twice_is_idempotent() {
        let config = StandingConfig::default();
        let mut once = GradeRecord::new();
        once.record_tp(14.0, &config);

        let mut twice = GradeRecord::new();
        twice.record_tp(14.0, &config);
        twice.record_tp(14.0, &config);

        assert_eq!(once, twice);
    }

    #[test]
    fn absences_flip_and_unflip_elimination() {
        let config = StandingConfig::default();
        let mut record = GradeRecord::from_parts(14.0, 12.0, 0, false, &config);
        assert!(!record.eliminated());

        record.set_absence_count(4, &config);
        assert!(record.eliminated());

        // Justifying an absence brings the count back under the limit.
        record.set_absence_count(3, &config);
        assert!(!record.eliminated());
    }

    #[test]
    fn hydration_recomputes_average_but_keeps_the_flag() {
        let config = StandingConfig::default();
        // Stored average of any value is discarded in favor of the scores.
        let record = GradeRecord::from_parts(12.0, 8.0, 0, true, &config);
        assert!((record.average() - 9.6).abs() < 1e-9);
        assert!(record.eliminated());

        // An ungraded record does not become eliminated by being loaded.
        let fresh = GradeRecord::from_parts(0.0, 0.0, 0, false, &config);
        assert_eq!(fresh.average(), 0.0);
        assert!(!fresh.eliminated());
    }
}
