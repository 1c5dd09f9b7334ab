use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use educore_models::{CourseId, Student, StudentId};

use crate::modules::courses::model::{Course, CourseQueryParams, CreateCourseDto, UpdateCourseDto};
use crate::modules::standing::Standing;
use crate::utils::errors::AppError;

const COURSE_COLUMNS: &str = "id, name, description, level, starts_at, ends_at, teacher_id, \
                              class_group_id, created_at, updated_at";

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, dto))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        let teacher_exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1)"#)
                .bind(dto.teacher_id)
                .fetch_one(db)
                .await
                .context("Failed to check teacher")
                .map_err(AppError::database)?;
        if !teacher_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Teacher not found")));
        }

        let sql = format!(
            r#"INSERT INTO courses (name, description, level, starts_at, ends_at, teacher_id, class_group_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {COURSE_COLUMNS}"#
        );

        sqlx::query_as::<_, Course>(&sql)
            .bind(&dto.name)
            .bind(&dto.description)
            .bind(&dto.level)
            .bind(dto.starts_at)
            .bind(dto.ends_at)
            .bind(dto.teacher_id)
            .bind(dto.class_group_id)
            .fetch_one(db)
            .await
            .context("Failed to create course")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_courses(
        db: &PgPool,
        params: &CourseQueryParams,
    ) -> Result<(Vec<Course>, i64), AppError> {
        let mut conditions = Vec::new();
        let mut idx = 0;
        if params.teacher_id.is_some() {
            idx += 1;
            conditions.push(format!("teacher_id = ${idx}"));
        }
        if params.class_group_id.is_some() {
            idx += 1;
            conditions.push(format!("class_group_id = ${idx}"));
        }
        let where_sql = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM courses {where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(teacher_id) = params.teacher_id {
            count_query = count_query.bind(teacher_id);
        }
        if let Some(class_group_id) = params.class_group_id {
            count_query = count_query.bind(class_group_id);
        }
        let total = count_query
            .fetch_one(db)
            .await
            .context("Failed to count courses")
            .map_err(AppError::database)?;

        let data_sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses {where_sql} \
             ORDER BY name LIMIT ${} OFFSET ${}",
            idx + 1,
            idx + 2
        );
        let mut data_query = sqlx::query_as::<_, Course>(&data_sql);
        if let Some(teacher_id) = params.teacher_id {
            data_query = data_query.bind(teacher_id);
        }
        if let Some(class_group_id) = params.class_group_id {
            data_query = data_query.bind(class_group_id);
        }
        let courses = data_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(db)
            .await
            .context("Failed to fetch courses")
            .map_err(AppError::database)?;

        Ok((courses, total))
    }

    #[instrument(skip(db))]
    pub async fn get_course_by_id(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");

        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch course by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Course not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        id: CourseId,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let existing = Self::get_course_by_id(db, id).await?;

        let name = dto.name.unwrap_or(existing.name);
        let description = dto.description.or(existing.description);
        let level = dto.level.unwrap_or(existing.level);
        let starts_at = dto.starts_at.unwrap_or(existing.starts_at);
        let ends_at = dto.ends_at.unwrap_or(existing.ends_at);
        let teacher_id = dto.teacher_id.unwrap_or(existing.teacher_id);
        let class_group_id = dto.class_group_id.or(existing.class_group_id);

        let sql = format!(
            r#"UPDATE courses
               SET name = $1, description = $2, level = $3, starts_at = $4, ends_at = $5,
                   teacher_id = $6, class_group_id = $7, updated_at = NOW()
               WHERE id = $8
               RETURNING {COURSE_COLUMNS}"#
        );

        sqlx::query_as::<_, Course>(&sql)
            .bind(&name)
            .bind(&description)
            .bind(&level)
            .bind(starts_at)
            .bind(ends_at)
            .bind(teacher_id)
            .bind(class_group_id)
            .bind(id)
            .fetch_one(db)
            .await
            .context("Failed to update course")
            .map_err(AppError::database)
    }

    /// Delete a course. Every enrolled student's association is dropped
    /// through the standing engine first, so each global flag is recomputed
    /// from the surviving records before the course row disappears.
    #[instrument(skip(db, standing))]
    pub async fn delete_course(
        db: &PgPool,
        standing: &Standing,
        id: CourseId,
    ) -> Result<(), AppError> {
        Self::get_course_by_id(db, id).await?;

        let enrolled: Vec<StudentId> =
            sqlx::query_scalar(r#"SELECT student_id FROM grade_records WHERE course_id = $1"#)
                .bind(id)
                .fetch_all(db)
                .await
                .context("Failed to list enrolled students")
                .map_err(AppError::database)?;

        for student_id in enrolled {
            standing
                .remove_course_association(student_id, id)
                .await
                .map_err(AppError::standing)?;
        }

        sqlx::query(r#"DELETE FROM courses WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete course")
            .map_err(AppError::database)?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_enrolled_students(
        db: &PgPool,
        id: CourseId,
    ) -> Result<Vec<Student>, AppError> {
        Self::get_course_by_id(db, id).await?;

        sqlx::query_as::<_, Student>(
            r#"SELECT s.id, s.first_name, s.last_name, s.email, s.date_of_birth,
                      s.class_group_id, s.homeroom_teacher_id, s.status, s.eliminated,
                      s.created_at, s.updated_at
               FROM students s
               JOIN grade_records gr ON gr.student_id = s.id
               WHERE gr.course_id = $1 AND s.deleted = FALSE
               ORDER BY s.last_name, s.first_name"#,
        )
        .bind(id)
        .fetch_all(db)
        .await
        .context("Failed to fetch enrolled students")
        .map_err(AppError::database)
    }
}
