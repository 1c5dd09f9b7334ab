use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use educore_models::{CourseId, StudentId};

use crate::modules::students::model::{
    CourseResult, CreateStudentDto, Student, StudentQueryParams, StudentResultsResponse,
    UpdateStudentDto,
};
use crate::utils::errors::AppError;

const STUDENT_COLUMNS: &str = "id, first_name, last_name, email, date_of_birth, class_group_id, \
                               homeroom_teacher_id, status, eliminated, created_at, updated_at";

pub struct StudentService;

impl StudentService {
    #[instrument(skip(db, dto))]
    pub async fn create_student(db: &PgPool, dto: CreateStudentDto) -> Result<Student, AppError> {
        let sql = format!(
            r#"INSERT INTO students
                   (first_name, last_name, email, date_of_birth, class_group_id, homeroom_teacher_id)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {STUDENT_COLUMNS}"#
        );

        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(&dto.first_name)
            .bind(&dto.last_name)
            .bind(&dto.email)
            .bind(dto.date_of_birth)
            .bind(dto.class_group_id)
            .bind(dto.homeroom_teacher_id)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Student with email {} already exists",
                        dto.email
                    ));
                }
                AppError::database(anyhow::Error::from(e))
            })?;

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        params: &StudentQueryParams,
    ) -> Result<(Vec<Student>, i64), AppError> {
        let mut conditions = vec!["deleted = FALSE".to_string()];
        let mut idx = 0;
        if params.eliminated.is_some() {
            idx += 1;
            conditions.push(format!("eliminated = ${idx}"));
        }
        if params.class_group_id.is_some() {
            idx += 1;
            conditions.push(format!("class_group_id = ${idx}"));
        }
        let where_sql = conditions.join(" AND ");

        let count_sql = format!("SELECT COUNT(*) FROM students WHERE {where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(eliminated) = params.eliminated {
            count_query = count_query.bind(eliminated);
        }
        if let Some(class_group_id) = params.class_group_id {
            count_query = count_query.bind(class_group_id);
        }
        let total = count_query
            .fetch_one(db)
            .await
            .context("Failed to count students")
            .map_err(AppError::database)?;

        let data_sql = format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE {where_sql} \
             ORDER BY last_name, first_name LIMIT ${} OFFSET ${}",
            idx + 1,
            idx + 2
        );
        let mut data_query = sqlx::query_as::<_, Student>(&data_sql);
        if let Some(eliminated) = params.eliminated {
            data_query = data_query.bind(eliminated);
        }
        if let Some(class_group_id) = params.class_group_id {
            data_query = data_query.bind(class_group_id);
        }
        let students = data_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(db)
            .await
            .context("Failed to fetch students")
            .map_err(AppError::database)?;

        Ok((students, total))
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_id(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1 AND deleted = FALSE");

        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student by ID")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let existing = Self::get_student_by_id(db, id).await?;

        let first_name = dto.first_name.unwrap_or(existing.first_name);
        let last_name = dto.last_name.unwrap_or(existing.last_name);
        let email = dto.email.unwrap_or(existing.email);
        let date_of_birth = dto.date_of_birth.or(existing.date_of_birth);
        let class_group_id = dto.class_group_id.or(existing.class_group_id);
        let homeroom_teacher_id = dto.homeroom_teacher_id.or(existing.homeroom_teacher_id);
        let status = dto.status.unwrap_or(existing.status);

        let sql = format!(
            r#"UPDATE students
               SET first_name = $1, last_name = $2, email = $3, date_of_birth = $4,
                   class_group_id = $5, homeroom_teacher_id = $6, status = $7, updated_at = NOW()
               WHERE id = $8 AND deleted = FALSE
               RETURNING {STUDENT_COLUMNS}"#
        );

        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(&first_name)
            .bind(&last_name)
            .bind(&email)
            .bind(date_of_birth)
            .bind(class_group_id)
            .bind(homeroom_teacher_id)
            .bind(status)
            .bind(id)
            .fetch_one(db)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return AppError::bad_request(anyhow::anyhow!(
                        "Student with email {} already exists",
                        email
                    ));
                }
                AppError::database(anyhow::Error::from(e))
            })?;

        Ok(student)
    }

    /// Soft delete: the row is kept so grade records and absences remain
    /// attached for history.
    #[instrument(skip(db))]
    pub async fn delete_student(db: &PgPool, id: StudentId) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE students SET deleted = TRUE, updated_at = NOW()
               WHERE id = $1 AND deleted = FALSE"#,
        )
        .bind(id)
        .execute(db)
        .await
        .context("Failed to delete student")
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        Ok(())
    }

    /// Associate the student with a course by creating the default grade
    /// record. Enrolling twice is a no-op.
    #[instrument(skip(db))]
    pub async fn enroll_course(
        db: &PgPool,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<(), AppError> {
        Self::get_student_by_id(db, student_id).await?;

        let course_exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)"#)
                .bind(course_id)
                .fetch_one(db)
                .await
                .context("Failed to check course")
                .map_err(AppError::database)?;
        if !course_exists {
            return Err(AppError::not_found(anyhow::anyhow!("Course not found")));
        }

        sqlx::query(
            r#"INSERT INTO grade_records (student_id, course_id)
               VALUES ($1, $2)
               ON CONFLICT (student_id, course_id) DO NOTHING"#,
        )
        .bind(student_id)
        .bind(course_id)
        .execute(db)
        .await
        .context("Failed to enroll student")
        .map_err(AppError::database)?;

        Ok(())
    }

    /// Per-course results view plus the aggregated elimination flag.
    #[instrument(skip(db))]
    pub async fn get_results(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<StudentResultsResponse, AppError> {
        let student = Self::get_student_by_id(db, student_id).await?;

        let results = sqlx::query_as::<_, CourseResult>(
            r#"SELECT gr.course_id, c.name AS course_name, gr.tp_score, gr.exam_score,
                      gr.average, gr.absence_count, gr.eliminated
               FROM grade_records gr
               JOIN courses c ON c.id = gr.course_id
               WHERE gr.student_id = $1
               ORDER BY c.name"#,
        )
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch student results")
        .map_err(AppError::database)?;

        Ok(StudentResultsResponse {
            student_id: student.id,
            eliminated: student.eliminated,
            results,
        })
    }
}
