//! Grade record DTOs.
//!
//! The grade record itself (scores, derived average, derived elimination
//! flag) is owned by the standing engine; these types are the wire
//! representation the HTTP layer exposes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{CourseId, StudentId};

/// DTO for recording a TP or exam score for one (student, course) pair.
///
/// The range check here mirrors the engine's own validation so obviously bad
/// payloads are rejected at the edge with a field-level message.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct RecordScoreDto {
    pub student_id: StudentId,
    pub course_id: CourseId,
    #[validate(range(min = 0.0, max = 20.0))]
    pub score: f64,
}

/// Persisted grade record row for one (student, course) pair.
///
/// `average` and `eliminated` are derived values; they are written by the
/// recomputation chain only and served as-is on reads.
#[derive(Serialize, FromRow, Debug, ToSchema)]
pub struct GradeRecordRow {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub tp_score: f64,
    pub exam_score: f64,
    pub average: f64,
    pub absence_count: i32,
    pub eliminated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_range_enforced() {
        let mut dto = RecordScoreDto {
            student_id: StudentId::new(),
            course_id: CourseId::new(),
            score: 15.5,
        };
        assert!(dto.validate().is_ok());

        dto.score = 20.5;
        assert!(dto.validate().is_err());

        dto.score = -0.1;
        assert!(dto.validate().is_err());
    }
}
