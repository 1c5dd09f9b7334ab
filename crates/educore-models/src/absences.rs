//! Absence event models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AbsenceId, CourseId, StudentId, TeacherId};

/// A recorded absence for one (student, course) pair.
///
/// Only unjustified absences count toward elimination; justified ones stay
/// queryable but are excluded from the standing recount.
#[derive(Serialize, FromRow, Debug, ToSchema)]
pub struct Absence {
    pub id: AbsenceId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub date: NaiveDate,
    pub justified: bool,
    pub reason: Option<String>,
    #[sqlx(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sqlx(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for recording a new absence.
///
/// `teacher_id` identifies the teacher filing the absence; it must match the
/// course's assigned teacher.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct RecordAbsenceDto {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub date: NaiveDate,
    #[serde(default)]
    pub justified: bool,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// DTO for flipping the justified flag on an existing absence.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct JustifyAbsenceDto {
    pub justified: bool,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Query parameters for listing absences.
#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct AbsenceQueryParams {
    pub student_id: Option<StudentId>,
    pub course_id: Option<CourseId>,
    pub teacher_id: Option<TeacherId>,
    pub justified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_dto_defaults_to_unjustified() {
        let json = format!(
            r#"{{"student_id":"{}","course_id":"{}","teacher_id":"{}","date":"2026-03-10"}}"#,
            StudentId::new(),
            CourseId::new(),
            TeacherId::new()
        );
        let dto: RecordAbsenceDto = serde_json::from_str(&json).unwrap();
        assert!(!dto.justified);
        assert!(dto.reason.is_none());
    }

    #[test]
    fn reason_length_capped() {
        let dto = JustifyAbsenceDto {
            justified: true,
            reason: Some("x".repeat(501)),
        };
        assert!(dto.validate().is_err());
    }
}
