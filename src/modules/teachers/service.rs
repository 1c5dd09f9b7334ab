use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use educore_models::{Course, TeacherId, TeacherStatus};

use crate::modules::teachers::model::{
    CreateTeacherDto, Teacher, TeacherQueryParams, UpdateTeacherDto,
};
use crate::utils::errors::AppError;

const TEACHER_COLUMNS: &str = "id, first_name, last_name, email, status, created_at, updated_at";

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db, dto))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
        let sql = format!(
            r#"INSERT INTO teachers (first_name, last_name, email)
               VALUES ($1, $2, $3)
               RETURNING {TEACHER_COLUMNS}"#
        );

        sqlx::query_as::<_, Teacher>(&sql)
            .bind(&dto.first_name)
            .bind(&dto.last_name)
            .bind(&dto.email)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Teacher with email {} already exists",
                        dto.email
                    ));
                }
                AppError::database(anyhow::Error::from(e))
            })
    }

    #[instrument(skip(db))]
    pub async fn get_teachers(
        db: &PgPool,
        params: &TeacherQueryParams,
    ) -> Result<(Vec<Teacher>, i64), AppError> {
        let (where_sql, has_status) = match params.status {
            Some(_) => ("WHERE status = $1", true),
            None => ("", false),
        };

        let count_sql = format!("SELECT COUNT(*) FROM teachers {where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(status) = params.status {
            count_query = count_query.bind(status);
        }
        let total = count_query
            .fetch_one(db)
            .await
            .context("Failed to count teachers")
            .map_err(AppError::database)?;

        let next = if has_status { 2 } else { 1 };
        let data_sql = format!(
            "SELECT {TEACHER_COLUMNS} FROM teachers {where_sql} \
             ORDER BY last_name, first_name LIMIT ${} OFFSET ${}",
            next,
            next + 1
        );
        let mut data_query = sqlx::query_as::<_, Teacher>(&data_sql);
        if let Some(status) = params.status {
            data_query = data_query.bind(status);
        }
        let teachers = data_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(db)
            .await
            .context("Failed to fetch teachers")
            .map_err(AppError::database)?;

        Ok((teachers, total))
    }

    #[instrument(skip(db))]
    pub async fn get_teacher_by_id(db: &PgPool, id: TeacherId) -> Result<Teacher, AppError> {
        let sql = format!("SELECT {TEACHER_COLUMNS} FROM teachers WHERE id = $1");

        sqlx::query_as::<_, Teacher>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch teacher by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Teacher not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: TeacherId,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let existing = Self::get_teacher_by_id(db, id).await?;

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let email = dto.email.unwrap_or(existing.email);
        let status = dto.status.unwrap_or(existing.status);

        let sql = format!(
            r#"UPDATE teachers
               SET first_name = $1, last_name = $2, email = $3, status = $4, updated_at = NOW()
               WHERE id = $5
               RETURNING {TEACHER_COLUMNS}"#
        );

        sqlx::query_as::<_, Teacher>(&sql)
            .bind(&first_name)
            .bind(&last_name)
            .bind(&email)
            .bind(status)
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Teacher with email {} already exists",
                        email
                    ));
                }
                AppError::database(anyhow::Error::from(e))
            })
    }

    /// Set the employment status. Used by the leave-request workflow.
    #[instrument(skip(db))]
    pub async fn set_status(
        db: &PgPool,
        id: TeacherId,
        status: TeacherStatus,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE teachers SET status = $2, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .bind(status)
        .execute(db)
        .await
        .context("Failed to update teacher status")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Teacher not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn delete_teacher(db: &PgPool, id: TeacherId) -> Result<(), AppError> {
        let teaches: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM courses WHERE teacher_id = $1"#)
                .bind(id)
                .fetch_one(db)
                .await
                .context("Failed to check teacher's courses")
                .map_err(AppError::database)?;
        if teaches > 0 {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Teacher still has {} assigned course(s); reassign or delete them first",
                teaches
            )));
        }

        let result = sqlx::query(r#"DELETE FROM teachers WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete teacher")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Teacher not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_courses(db: &PgPool, id: TeacherId) -> Result<Vec<Course>, AppError> {
        Self::get_teacher_by_id(db, id).await?;

        sqlx::query_as::<_, Course>(
            r#"SELECT id, name, description, level, starts_at, ends_at, teacher_id,
                      class_group_id, created_at, updated_at
               FROM courses
               WHERE teacher_id = $1
               ORDER BY name"#,
        )
        .bind(id)
        .fetch_all(db)
        .await
        .context("Failed to fetch teacher's courses")
        .map_err(AppError::database)
    }
}
