//! Student domain models and DTOs.
//!
//! Students carry a lifecycle `status`, a soft `deleted` marker, and a
//! derived global `eliminated` flag. The flag is owned by the academic
//! standing recomputation chain; nothing in this crate ever sets it from a
//! request payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{ClassGroupId, CourseId, StudentId, TeacherId};
use crate::macros::text_enum;

text_enum!(
    /// Lifecycle status of a student. Independent of elimination, which is
    /// derived from per-course standing.
    StudentStatus {
        Active => "active",
        Inactive => "inactive",
        Graduated => "graduated",
    }
);

impl Default for StudentStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Pagination metadata for student responses.
#[derive(Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Paginated response containing students.
#[derive(Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

/// Query parameters for filtering and paginating students.
#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct StudentQueryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Filter on the derived global elimination flag.
    pub eliminated: Option<bool>,
    /// Restrict to one class group.
    pub class_group_id: Option<ClassGroupId>,
}

impl StudentQueryParams {
    /// Get the page number, defaulting to 1 if not specified.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Get the limit, defaulting to 10 and clamping between 1 and 100.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// Calculate the offset based on page and limit.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// A student in the system.
///
/// Soft-deleted students are never returned by list or get queries; the row
/// is kept so historical grade records stay attached.
#[derive(Serialize, FromRow, Debug, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub class_group_id: Option<ClassGroupId>,
    pub homeroom_teacher_id: Option<TeacherId>,
    pub status: StudentStatus,
    /// Derived: true iff at least one of the student's grade records is
    /// eliminated. Written only by the standing recomputation chain.
    pub eliminated: bool,
    #[sqlx(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sqlx(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new student.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub class_group_id: Option<ClassGroupId>,
    pub homeroom_teacher_id: Option<TeacherId>,
}

/// DTO for updating an existing student.
///
/// All fields are optional; only provided fields will be updated. The
/// `eliminated` flag deliberately has no counterpart here.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub class_group_id: Option<ClassGroupId>,
    pub homeroom_teacher_id: Option<TeacherId>,
    pub status: Option<StudentStatus>,
}

/// One row of the per-course results view for a student.
#[derive(Serialize, FromRow, Debug, ToSchema)]
pub struct CourseResult {
    pub course_id: CourseId,
    pub course_name: String,
    pub tp_score: f64,
    pub exam_score: f64,
    pub average: f64,
    pub absence_count: i32,
    pub eliminated: bool,
}

/// Full results view: all per-course rows plus the aggregated flag.
#[derive(Serialize, Debug, ToSchema)]
pub struct StudentResultsResponse {
    pub student_id: StudentId,
    pub eliminated: bool,
    pub results: Vec<CourseResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_defaults() {
        let params = StudentQueryParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn query_params_clamping() {
        let params = StudentQueryParams {
            page: Some(-2),
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 100);
    }

    #[test]
    fn query_params_offset() {
        let params = StudentQueryParams {
            page: Some(4),
            limit: Some(25),
            ..Default::default()
        };
        assert_eq!(params.offset(), 75);
    }

    #[test]
    fn create_dto_accepts_valid_input() {
        let dto = CreateStudentDto {
            first_name: "Amira".to_string(),
            last_name: "Ben Salah".to_string(),
            email: "amira@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2004, 9, 1),
            class_group_id: None,
            homeroom_teacher_id: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn create_dto_rejects_bad_email() {
        let dto = CreateStudentDto {
            first_name: "Amira".to_string(),
            last_name: "Ben Salah".to_string(),
            email: "not-an-email".to_string(),
            date_of_birth: None,
            class_group_id: None,
            homeroom_teacher_id: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn create_dto_rejects_empty_name() {
        let dto = CreateStudentDto {
            first_name: String::new(),
            last_name: "Ben Salah".to_string(),
            email: "amira@example.com".to_string(),
            date_of_birth: None,
            class_group_id: None,
            homeroom_teacher_id: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn status_text_roundtrip() {
        for status in [
            StudentStatus::Active,
            StudentStatus::Inactive,
            StudentStatus::Graduated,
        ] {
            assert_eq!(status.as_str().parse::<StudentStatus>().unwrap(), status);
        }
        assert!("expelled".parse::<StudentStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&StudentStatus::Graduated).unwrap();
        assert_eq!(json, r#""graduated""#);
    }
}
