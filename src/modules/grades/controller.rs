use crate::modules::grades::model::{GradeRecordRow, RecordScoreDto};
use crate::modules::grades::service::GradeService;
use crate::modules::students::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    Json,
    extract::{Path, State},
};
use educore_models::{CourseId, StudentId};
use tracing::instrument;
use validator::Validate;

#[utoipa::path(
    put,
    path = "/api/grades/tp",
    request_body = RecordScoreDto,
    responses(
        (status = 200, description = "TP score recorded; returns the recomputed record", body = GradeRecordRow),
        (status = 400, description = "Score out of range", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn record_tp_score(
    State(state): State<AppState>,
    Json(dto): Json<RecordScoreDto>,
) -> Result<Json<GradeRecordRow>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let record = GradeService::record_tp_score(&state.standing, &dto).await?;
    Ok(Json(record))
}

#[utoipa::path(
    put,
    path = "/api/grades/exam",
    request_body = RecordScoreDto,
    responses(
        (status = 200, description = "Exam score recorded; returns the recomputed record", body = GradeRecordRow),
        (status = 400, description = "Score out of range", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn record_exam_score(
    State(state): State<AppState>,
    Json(dto): Json<RecordScoreDto>,
) -> Result<Json<GradeRecordRow>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let record = GradeService::record_exam_score(&state.standing, &dto).await?;
    Ok(Json(record))
}

#[utoipa::path(
    get,
    path = "/api/grades/students/{student_id}",
    params(("student_id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Grade records for the student", body = [GradeRecordRow]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn get_student_records(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
) -> Result<Json<Vec<GradeRecordRow>>, AppError> {
    let records = GradeService::get_records_by_student(&state.db, student_id).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/grades/courses/{course_id}",
    params(("course_id" = CourseId, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Grade records for the course", body = [GradeRecordRow]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Grades"
)]
#[instrument(skip(state))]
pub async fn get_course_records(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Vec<GradeRecordRow>>, AppError> {
    let records = GradeService::get_records_by_course(&state.db, course_id).await?;
    Ok(Json(records))
}
