use crate::modules::students::controller::ErrorResponse;
use crate::modules::teachers::model::{
    CreateTeacherDto, Teacher, TeacherQueryParams, UpdateTeacherDto,
};
use crate::modules::teachers::service::TeacherService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use educore_models::{Course, TeacherId};
use serde_json::json;
use tracing::instrument;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 200, description = "Teacher created successfully", body = Teacher),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn create_teacher(
    State(state): State<AppState>,
    Json(dto): Json<CreateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let teacher = TeacherService::create_teacher(&state.db, dto).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    get,
    path = "/api/teachers",
    params(TeacherQueryParams),
    responses(
        (status = 200, description = "List of teachers"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teachers(
    State(state): State<AppState>,
    Query(params): Query<TeacherQueryParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (teachers, total) = TeacherService::get_teachers(&state.db, &params).await?;

    let limit = params.limit();
    let total_pages = (total as f64 / limit as f64).ceil() as i64;

    Ok(Json(json!({
        "data": teachers,
        "meta": {
            "page": params.page(),
            "limit": limit,
            "total": total,
            "total_pages": total_pages,
        }
    })))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher details", body = Teacher),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::get_teacher_by_id(&state.db, id).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated successfully", body = Teacher),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
    Json(dto): Json<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let teacher = TeacherService::update_teacher(&state.db, id, dto).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher deleted successfully"),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 409, description = "Teacher still has assigned courses", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
) -> Result<Json<serde_json::Value>, AppError> {
    TeacherService::delete_teacher(&state.db, id).await?;
    Ok(Json(json!({"message": "Teacher deleted successfully"})))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/courses",
    params(("id" = TeacherId, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Courses taught by the teacher", body = [Course]),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Teachers"
)]
#[instrument(skip(state))]
pub async fn get_teacher_courses(
    State(state): State<AppState>,
    Path(id): Path<TeacherId>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = TeacherService::get_courses(&state.db, id).await?;
    Ok(Json(courses))
}
