//! Class group (homeroom class) models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassGroupId, StudentId};

/// A class group students and courses can be attached to.
#[derive(Serialize, FromRow, Debug, ToSchema)]
pub struct ClassGroup {
    pub id: ClassGroupId,
    pub name: String,
    pub level: String,
    #[sqlx(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sqlx(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a class group.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CreateClassGroupDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub level: String,
}

/// DTO for updating a class group.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct UpdateClassGroupDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub level: Option<String>,
}

/// DTO for assigning a student to a class group.
#[derive(Deserialize, Debug, ToSchema)]
pub struct AssignStudentDto {
    pub student_id: StudentId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dto_rejects_blank_fields() {
        let dto = CreateClassGroupDto {
            name: String::new(),
            level: "L1".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
