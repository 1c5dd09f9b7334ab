use crate::modules::class_groups::model::{
    AssignStudentDto, ClassGroup, CreateClassGroupDto, UpdateClassGroupDto,
};
use crate::modules::class_groups::service::ClassGroupService;
use crate::modules::students::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    Json,
    extract::{Path, State},
};
use educore_models::ClassGroupId;
use serde_json::json;
use tracing::instrument;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassGroupDto,
    responses(
        (status = 200, description = "Class group created successfully", body = ClassGroup),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn create_class_group(
    State(state): State<AppState>,
    Json(dto): Json<CreateClassGroupDto>,
) -> Result<Json<ClassGroup>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let class_group = ClassGroupService::create_class_group(&state.db, dto).await?;
    Ok(Json(class_group))
}

#[utoipa::path(
    get,
    path = "/api/classes",
    responses(
        (status = 200, description = "All class groups", body = [ClassGroup]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassGroup>>, AppError> {
    let class_groups = ClassGroupService::get_class_groups(&state.db).await?;
    Ok(Json(class_groups))
}

#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = ClassGroupId, Path, description = "Class group ID")),
    responses(
        (status = 200, description = "Class group details", body = ClassGroup),
        (status = 404, description = "Class group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn get_class_group(
    State(state): State<AppState>,
    Path(id): Path<ClassGroupId>,
) -> Result<Json<ClassGroup>, AppError> {
    let class_group = ClassGroupService::get_class_group_by_id(&state.db, id).await?;
    Ok(Json(class_group))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(("id" = ClassGroupId, Path, description = "Class group ID")),
    request_body = UpdateClassGroupDto,
    responses(
        (status = 200, description = "Class group updated successfully", body = ClassGroup),
        (status = 404, description = "Class group not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn update_class_group(
    State(state): State<AppState>,
    Path(id): Path<ClassGroupId>,
    Json(dto): Json<UpdateClassGroupDto>,
) -> Result<Json<ClassGroup>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let class_group = ClassGroupService::update_class_group(&state.db, id, dto).await?;
    Ok(Json(class_group))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = ClassGroupId, Path, description = "Class group ID")),
    responses(
        (status = 200, description = "Class group deleted successfully"),
        (status = 404, description = "Class group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn delete_class_group(
    State(state): State<AppState>,
    Path(id): Path<ClassGroupId>,
) -> Result<Json<serde_json::Value>, AppError> {
    ClassGroupService::delete_class_group(&state.db, id).await?;
    Ok(Json(json!({"message": "Class group deleted successfully"})))
}

#[utoipa::path(
    post,
    path = "/api/classes/{id}/students",
    params(("id" = ClassGroupId, Path, description = "Class group ID")),
    request_body = AssignStudentDto,
    responses(
        (status = 200, description = "Student assigned to class group"),
        (status = 404, description = "Class group or student not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Classes"
)]
#[instrument(skip(state))]
pub async fn assign_student(
    State(state): State<AppState>,
    Path(id): Path<ClassGroupId>,
    Json(dto): Json<AssignStudentDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    ClassGroupService::assign_student(&state.db, id, dto.student_id).await?;
    Ok(Json(json!({"message": "Student assigned successfully"})))
}
