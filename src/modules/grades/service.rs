use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use educore_models::{CourseId, StudentId};
use educore_standing::GradeRecord;

use crate::metrics::track_score_recorded;
use crate::modules::grades::model::{GradeRecordRow, RecordScoreDto};
use crate::modules::standing::Standing;
use crate::utils::errors::AppError;

pub struct GradeService;

impl GradeService {
    /// Record a TP score through the standing engine. The engine owns the
    /// recomputation chain; this layer only adapts errors and metrics.
    #[instrument(skip(standing))]
    pub async fn record_tp_score(
        standing: &Standing,
        dto: &RecordScoreDto,
    ) -> Result<GradeRecordRow, AppError> {
        let record = standing
            .record_tp_score(dto.student_id, dto.course_id, dto.score)
            .await
            .map_err(AppError::standing)?;
        track_score_recorded("tp");
        Ok(to_row(dto.student_id, dto.course_id, &record))
    }

    /// Record an exam score through the standing engine.
    #[instrument(skip(standing))]
    pub async fn record_exam_score(
        standing: &Standing,
        dto: &RecordScoreDto,
    ) -> Result<GradeRecordRow, AppError> {
        let record = standing
            .record_exam_score(dto.student_id, dto.course_id, dto.score)
            .await
            .map_err(AppError::standing)?;
        track_score_recorded("exam");
        Ok(to_row(dto.student_id, dto.course_id, &record))
    }

    #[instrument(skip(db))]
    pub async fn get_records_by_student(
        db: &PgPool,
        student_id: StudentId,
    ) -> Result<Vec<GradeRecordRow>, AppError> {
        sqlx::query_as::<_, GradeRecordRow>(
            r#"SELECT student_id, course_id, tp_score, exam_score, average, absence_count, eliminated
               FROM grade_records
               WHERE student_id = $1
               ORDER BY course_id"#,
        )
        .bind(student_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch grade records by student")
        .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_records_by_course(
        db: &PgPool,
        course_id: CourseId,
    ) -> Result<Vec<GradeRecordRow>, AppError> {
        sqlx::query_as::<_, GradeRecordRow>(
            r#"SELECT student_id, course_id, tp_score, exam_score, average, absence_count, eliminated
               FROM grade_records
               WHERE course_id = $1
               ORDER BY student_id"#,
        )
        .bind(course_id)
        .fetch_all(db)
        .await
        .context("Failed to fetch grade records by course")
        .map_err(AppError::database)
    }
}

fn to_row(student_id: StudentId, course_id: CourseId, record: &GradeRecord) -> GradeRecordRow {
    GradeRecordRow {
        student_id,
        course_id,
        tp_score: record.tp_score(),
        exam_score: record.exam_score(),
        average: record.average(),
        absence_count: record.absence_count() as i32,
        eliminated: record.eliminated(),
    }
}
