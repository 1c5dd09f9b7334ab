use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

use educore_models::{AbsenceId, CourseId, StudentId, TeacherId};
use educore_standing::{
    AbsenceEvent, CourseSnapshot, GradeRecord, NewAbsence, StandingConfig, StandingStore,
    StoreError, StudentSnapshot,
};

/// PostgreSQL implementation of the standing engine's persistence
/// collaborator.
///
/// Grade records are hydrated through `GradeRecord::from_parts`: the
/// average column stored for query performance is recomputed from the
/// scores on load, while the elimination flag is carried as the last
/// evaluated outcome.
#[derive(Clone)]
pub struct PgStandingStore {
    pool: PgPool,
    config: StandingConfig,
}

impl PgStandingStore {
    pub fn new(pool: PgPool, config: StandingConfig) -> Self {
        Self { pool, config }
    }
}

#[derive(FromRow)]
struct StudentRow {
    id: StudentId,
    first_name: String,
    last_name: String,
    email: String,
    eliminated: bool,
}

#[derive(FromRow)]
struct RecordRow {
    course_id: CourseId,
    tp_score: f64,
    exam_score: f64,
    absence_count: i32,
    eliminated: bool,
}

#[derive(FromRow)]
struct CourseRow {
    id: CourseId,
    name: String,
    teacher_id: TeacherId,
    teacher_email: Option<String>,
}

#[derive(FromRow)]
struct AbsenceRow {
    id: AbsenceId,
    student_id: StudentId,
    course_id: CourseId,
    teacher_id: TeacherId,
    date: NaiveDate,
    justified: bool,
    reason: Option<String>,
}

impl From<AbsenceRow> for AbsenceEvent {
    fn from(row: AbsenceRow) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            course_id: row.course_id,
            teacher_id: row.teacher_id,
            date: row.date,
            justified: row.justified,
            reason: row.reason,
        }
    }
}

impl StandingStore for PgStandingStore {
    async fn load_student(&self, id: StudentId) -> Result<Option<StudentSnapshot>, StoreError> {
        let row = sqlx::query_as::<_, StudentRow>(
            r#"SELECT id, first_name, last_name, email, eliminated
               FROM students
               WHERE id = $1 AND deleted = FALSE"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let Some(student) = row else {
            return Ok(None);
        };

        let record_rows = sqlx::query_as::<_, RecordRow>(
            r#"SELECT course_id, tp_score, exam_score, absence_count, eliminated
               FROM grade_records
               WHERE student_id = $1"#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        let records: HashMap<CourseId, GradeRecord> = record_rows
            .into_iter()
            .map(|row| {
                (
                    row.course_id,
                    GradeRecord::from_parts(
                        row.tp_score,
                        row.exam_score,
                        row.absence_count.max(0) as u32,
                        row.eliminated,
                        &self.config,
                    ),
                )
            })
            .collect();

        Ok(Some(StudentSnapshot {
            id: student.id,
            full_name: format!("{} {}", student.first_name, student.last_name),
            email: student.email,
            eliminated: student.eliminated,
            records,
        }))
    }

    async fn load_course(&self, id: CourseId) -> Result<Option<CourseSnapshot>, StoreError> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"SELECT c.id, c.name, c.teacher_id, t.email AS teacher_email
               FROM courses c
               LEFT JOIN teachers t ON t.id = c.teacher_id
               WHERE c.id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(|course| CourseSnapshot {
            id: course.id,
            name: course.name,
            teacher_id: course.teacher_id,
            teacher_email: course.teacher_email,
        }))
    }

    async fn load_absence(&self, id: AbsenceId) -> Result<Option<AbsenceEvent>, StoreError> {
        let row = sqlx::query_as::<_, AbsenceRow>(
            r#"SELECT id, student_id, course_id, teacher_id, date, justified, reason
               FROM absences
               WHERE id = $1 AND deleted = FALSE"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.map(AbsenceEvent::from))
    }

    async fn insert_absence(&self, absence: NewAbsence) -> Result<AbsenceEvent, StoreError> {
        let row = sqlx::query_as::<_, AbsenceRow>(
            r#"INSERT INTO absences (student_id, course_id, teacher_id, date, justified, reason)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, student_id, course_id, teacher_id, date, justified, reason"#,
        )
        .bind(absence.student_id)
        .bind(absence.course_id)
        .bind(absence.teacher_id)
        .bind(absence.date)
        .bind(absence.justified)
        .bind(&absence.reason)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(row.into())
    }

    async fn update_absence_justification(
        &self,
        id: AbsenceId,
        justified: bool,
        reason: Option<String>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE absences
               SET justified = $2, reason = COALESCE($3, reason), updated_at = NOW()
               WHERE id = $1 AND deleted = FALSE"#,
        )
        .bind(id)
        .bind(justified)
        .bind(&reason)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn delete_absence(&self, id: AbsenceId) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE absences SET deleted = TRUE, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(())
    }

    async fn count_unjustified_absences(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<u32, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*)
               FROM absences
               WHERE student_id = $1 AND course_id = $2
                 AND justified = FALSE AND deleted = FALSE"#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(count.max(0) as u32)
    }

    async fn save_standing(&self, snapshot: &StudentSnapshot) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        for (course_id, record) in &snapshot.records {
            sqlx::query(
                r#"INSERT INTO grade_records
                       (student_id, course_id, tp_score, exam_score, average, absence_count, eliminated)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)
                   ON CONFLICT (student_id, course_id) DO UPDATE SET
                       tp_score = EXCLUDED.tp_score,
                       exam_score = EXCLUDED.exam_score,
                       average = EXCLUDED.average,
                       absence_count = EXCLUDED.absence_count,
                       eliminated = EXCLUDED.eliminated,
                       updated_at = NOW()"#,
            )
            .bind(snapshot.id)
            .bind(course_id)
            .bind(record.tp_score())
            .bind(record.exam_score())
            .bind(record.average())
            .bind(record.absence_count() as i32)
            .bind(record.eliminated())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::backend)?;
        }

        sqlx::query(
            r#"UPDATE students SET eliminated = $2, updated_at = NOW() WHERE id = $1"#,
        )
        .bind(snapshot.id)
        .bind(snapshot.eliminated)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)
    }

    async fn delete_record(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM grade_records WHERE student_id = $1 AND course_id = $2"#)
            .bind(student_id)
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        Ok(())
    }
}
