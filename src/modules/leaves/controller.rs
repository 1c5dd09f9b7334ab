use crate::modules::leaves::model::{
    CreateLeaveRequestDto, LeaveDecisionDto, LeaveQueryParams, LeaveRequest,
};
use crate::modules::leaves::service::LeaveService;
use crate::modules::students::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use educore_models::LeaveRequestId;
use tracing::instrument;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body = CreateLeaveRequestDto,
    responses(
        (status = 200, description = "Leave request filed", body = LeaveRequest),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(dto): Json<CreateLeaveRequestDto>,
) -> Result<Json<LeaveRequest>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let leave = LeaveService::create_leave_request(&state.db, dto).await?;
    Ok(Json(leave))
}

#[utoipa::path(
    get,
    path = "/api/leaves",
    params(LeaveQueryParams),
    responses(
        (status = 200, description = "Leave requests matching the filters", body = [LeaveRequest]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn get_leave_requests(
    State(state): State<AppState>,
    Query(params): Query<LeaveQueryParams>,
) -> Result<Json<Vec<LeaveRequest>>, AppError> {
    let leaves = LeaveService::get_leave_requests(&state.db, &params).await?;
    Ok(Json(leaves))
}

#[utoipa::path(
    get,
    path = "/api/leaves/{id}",
    params(("id" = LeaveRequestId, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request details", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn get_leave_request(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
) -> Result<Json<LeaveRequest>, AppError> {
    let leave = LeaveService::get_leave_request_by_id(&state.db, id).await?;
    Ok(Json(leave))
}

#[utoipa::path(
    put,
    path = "/api/leaves/{id}/approve",
    params(("id" = LeaveRequestId, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave approved; teacher now on leave", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Leave request is not pending", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn approve_leave_request(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
) -> Result<Json<LeaveRequest>, AppError> {
    let leave = LeaveService::approve(&state.db, &state.email, id).await?;
    Ok(Json(leave))
}

#[utoipa::path(
    put,
    path = "/api/leaves/{id}/reject",
    params(("id" = LeaveRequestId, Path, description = "Leave request ID")),
    request_body = LeaveDecisionDto,
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Leave request is not pending", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn reject_leave_request(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
    Json(dto): Json<LeaveDecisionDto>,
) -> Result<Json<LeaveRequest>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let leave = LeaveService::reject(&state.db, &state.email, id, dto.reason).await?;
    Ok(Json(leave))
}

#[utoipa::path(
    put,
    path = "/api/leaves/{id}/cancel",
    params(("id" = LeaveRequestId, Path, description = "Leave request ID")),
    request_body = LeaveDecisionDto,
    responses(
        (status = 200, description = "Leave cancelled; teacher restored if it was approved", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = ErrorResponse),
        (status = 409, description = "Leave request is already settled", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Leaves"
)]
#[instrument(skip(state))]
pub async fn cancel_leave_request(
    State(state): State<AppState>,
    Path(id): Path<LeaveRequestId>,
    Json(dto): Json<LeaveDecisionDto>,
) -> Result<Json<LeaveRequest>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let leave = LeaveService::cancel(&state.db, &state.email, id, dto.reason).await?;
    Ok(Json(leave))
}
