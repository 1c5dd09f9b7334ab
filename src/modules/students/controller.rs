use crate::modules::students::model::{
    CreateStudentDto, PaginatedStudentsResponse, PaginationMeta, Student, StudentQueryParams,
    StudentResultsResponse, UpdateStudentDto,
};
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use educore_models::{CourseId, StudentId};
use serde_json::json;
use tracing::instrument;
use validator::Validate;

/// Error body returned by every handler on failure.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentDto,
    responses(
        (status = 200, description = "Student created successfully", body = Student),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn create_student(
    State(state): State<AppState>,
    Json(dto): Json<CreateStudentDto>,
) -> Result<Json<Student>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let student = StudentService::create_student(&state.db, dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentQueryParams),
    responses(
        (status = 200, description = "List of students", body = PaginatedStudentsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_students(
    State(state): State<AppState>,
    Query(params): Query<StudentQueryParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let (students, total) = StudentService::get_students(&state.db, &params).await?;

    let limit = params.limit();
    let total_pages = (total as f64 / limit as f64).ceil() as i64;

    Ok(Json(PaginatedStudentsResponse {
        data: students,
        meta: PaginationMeta {
            page: params.page(),
            limit,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student_by_id(&state.db, id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated successfully", body = Student),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
    Json(dto): Json<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let student = StudentService::update_student(&state.db, id, dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student deleted successfully"),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<serde_json::Value>, AppError> {
    StudentService::delete_student(&state.db, id).await?;
    Ok(Json(json!({"message": "Student deleted successfully"})))
}

#[utoipa::path(
    post,
    path = "/api/students/{id}/courses/{course_id}",
    params(
        ("id" = StudentId, Path, description = "Student ID"),
        ("course_id" = CourseId, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Student enrolled in course"),
        (status = 404, description = "Student or course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn enroll_course(
    State(state): State<AppState>,
    Path((id, course_id)): Path<(StudentId, CourseId)>,
) -> Result<Json<serde_json::Value>, AppError> {
    StudentService::enroll_course(&state.db, id, course_id).await?;
    Ok(Json(json!({"message": "Student enrolled successfully"})))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}/courses/{course_id}",
    params(
        ("id" = StudentId, Path, description = "Student ID"),
        ("course_id" = CourseId, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Association removed; returns the recomputed global flag"),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn unenroll_course(
    State(state): State<AppState>,
    Path((id, course_id)): Path<(StudentId, CourseId)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let eliminated = state
        .standing
        .remove_course_association(id, course_id)
        .await
        .map_err(AppError::standing)?;
    Ok(Json(
        json!({"message": "Course association removed", "eliminated": eliminated}),
    ))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/results",
    params(("id" = StudentId, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Per-course results and global standing", body = StudentResultsResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Students"
)]
#[instrument(skip(state))]
pub async fn get_results(
    State(state): State<AppState>,
    Path(id): Path<StudentId>,
) -> Result<Json<StudentResultsResponse>, AppError> {
    let results = StudentService::get_results(&state.db, id).await?;
    Ok(Json(results))
}
