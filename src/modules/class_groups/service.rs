use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use educore_models::{ClassGroupId, StudentId};

use crate::modules::class_groups::model::{ClassGroup, CreateClassGroupDto, UpdateClassGroupDto};
use crate::utils::errors::AppError;

const CLASS_GROUP_COLUMNS: &str = "id, name, level, created_at, updated_at";

pub struct ClassGroupService;

impl ClassGroupService {
    #[instrument(skip(db, dto))]
    pub async fn create_class_group(
        db: &PgPool,
        dto: CreateClassGroupDto,
    ) -> Result<ClassGroup, AppError> {
        let sql = format!(
            r#"INSERT INTO class_groups (name, level)
               VALUES ($1, $2)
               RETURNING {CLASS_GROUP_COLUMNS}"#
        );

        sqlx::query_as::<_, ClassGroup>(&sql)
            .bind(&dto.name)
            .bind(&dto.level)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "A class group named {} already exists",
                        dto.name
                    ));
                }
                AppError::database(anyhow::Error::from(e))
            })
    }

    #[instrument(skip(db))]
    pub async fn get_class_groups(db: &PgPool) -> Result<Vec<ClassGroup>, AppError> {
        let sql = format!("SELECT {CLASS_GROUP_COLUMNS} FROM class_groups ORDER BY name");

        sqlx::query_as::<_, ClassGroup>(&sql)
            .fetch_all(db)
            .await
            .context("Failed to fetch class groups")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_class_group_by_id(
        db: &PgPool,
        id: ClassGroupId,
    ) -> Result<ClassGroup, AppError> {
        let sql = format!("SELECT {CLASS_GROUP_COLUMNS} FROM class_groups WHERE id = $1");

        sqlx::query_as::<_, ClassGroup>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch class group")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Class group not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_class_group(
        db: &PgPool,
        id: ClassGroupId,
        dto: UpdateClassGroupDto,
    ) -> Result<ClassGroup, AppError> {
        let existing = Self::get_class_group_by_id(db, id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let level = dto.level.unwrap_or(existing.level);

        let sql = format!(
            r#"UPDATE class_groups
               SET name = $1, level = $2, updated_at = NOW()
               WHERE id = $3
               RETURNING {CLASS_GROUP_COLUMNS}"#
        );

        sqlx::query_as::<_, ClassGroup>(&sql)
            .bind(&name)
            .bind(&level)
            .bind(id)
            .fetch_one(db)
            .await
            .context("Failed to update class group")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn delete_class_group(db: &PgPool, id: ClassGroupId) -> Result<(), AppError> {
        let result = sqlx::query(r#"DELETE FROM class_groups WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete class group")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Class group not found")));
        }

        Ok(())
    }

    /// Attach a student to the class group.
    #[instrument(skip(db))]
    pub async fn assign_student(
        db: &PgPool,
        id: ClassGroupId,
        student_id: StudentId,
    ) -> Result<(), AppError> {
        Self::get_class_group_by_id(db, id).await?;

        let result = sqlx::query(
            r#"UPDATE students SET class_group_id = $2, updated_at = NOW()
               WHERE id = $1 AND deleted = FALSE"#,
        )
        .bind(student_id)
        .bind(id)
        .execute(db)
        .await
        .context("Failed to assign student to class group")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        Ok(())
    }
}
