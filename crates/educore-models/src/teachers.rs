//! Teacher domain models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::TeacherId;
use crate::macros::text_enum;

text_enum!(
    /// Employment status of a teacher. `OnLeave` is set by the leave-request
    /// workflow when a request is approved and cleared when it is cancelled.
    TeacherStatus {
        Active => "active",
        OnLeave => "on_leave",
        Inactive => "inactive",
    }
);

impl Default for TeacherStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// A teacher in the system.
#[derive(Serialize, FromRow, Debug, ToSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: TeacherStatus,
    #[sqlx(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sqlx(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new teacher.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CreateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
}

/// DTO for updating an existing teacher.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub status: Option<TeacherStatus>,
}

/// Query parameters for listing teachers.
#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct TeacherQueryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<TeacherStatus>,
}

impl TeacherQueryParams {
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
    fn create_dto_requires_valid_email() {
        let dto = CreateTeacherDto {
            first_name: "Karim".to_string(),
            last_name: "Haddad".to_string(),
            email: "karim".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn status_roundtrip() {
        assert_eq!(
            "on_leave".parse::<TeacherStatus>().unwrap(),
            TeacherStatus::OnLeave
        );
        assert_eq!(TeacherStatus::OnLeave.as_str(), "on_leave");
        assert!("retired".parse::<TeacherStatus>().is_err());
    }

    #[test]
    fn default_status_is_active() {
        assert_eq!(TeacherStatus::default(), TeacherStatus::Active);
    }
}
