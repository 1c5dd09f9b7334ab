//! Course domain models and DTOs.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{ClassGroupId, CourseId, TeacherId};

/// A course taught by exactly one teacher, optionally bound to a class group.
///
/// Course lifecycle is independent of students; deleting a course cascades
/// into its grade records and absences.
#[derive(Serialize, FromRow, Debug, ToSchema)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub description: Option<String>,
    pub level: String,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub teacher_id: TeacherId,
    pub class_group_id: Option<ClassGroupId>,
    #[sqlx(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sqlx(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new course.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub level: String,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
    pub teacher_id: TeacherId,
    pub class_group_id: Option<ClassGroupId>,
}

/// DTO for updating an existing course.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 150))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub level: Option<String>,
    pub starts_at: Option<NaiveTime>,
    pub ends_at: Option<NaiveTime>,
    pub teacher_id: Option<TeacherId>,
    pub class_group_id: Option<ClassGroupId>,
}

/// Query parameters for listing courses.
#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct CourseQueryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub teacher_id: Option<TeacherId>,
    pub class_group_id: Option<ClassGroupId>,
}

impl CourseQueryParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dto_rejects_empty_name() {
        let dto = CreateCourseDto {
            name: String::new(),
            description: None,
            level: "L2".to_string(),
            starts_at: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            ends_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            teacher_id: TeacherId::new(),
            class_group_id: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn create_dto_accepts_valid_input() {
        let dto = CreateCourseDto {
            name: "Analyse 2".to_string(),
            description: Some("Suites et séries de fonctions".to_string()),
            level: "L2".to_string(),
            starts_at: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            ends_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            teacher_id: TeacherId::new(),
            class_group_id: None,
        };
        assert!(dto.validate().is_ok());
    }
}
