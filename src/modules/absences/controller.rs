use crate::modules::absences::model::{
    Absence, AbsenceQueryParams, JustifyAbsenceDto, RecordAbsenceDto,
};
use crate::modules::absences::service::AbsenceService;
use crate::modules::students::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use educore_models::AbsenceId;
use serde_json::json;
use tracing::instrument;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/absences",
    request_body = RecordAbsenceDto,
    responses(
        (status = 200, description = "Absence recorded; standing recomputed", body = Absence),
        (status = 400, description = "Invalid absence date", body = ErrorResponse),
        (status = 403, description = "Teacher does not own the course", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Absences"
)]
#[instrument(skip(state))]
pub async fn record_absence(
    State(state): State<AppState>,
    Json(dto): Json<RecordAbsenceDto>,
) -> Result<Json<Absence>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let absence = AbsenceService::record_absence(&state.db, &state.standing, dto).await?;
    Ok(Json(absence))
}

#[utoipa::path(
    get,
    path = "/api/absences",
    params(AbsenceQueryParams),
    responses(
        (status = 200, description = "Absences matching the filters", body = [Absence]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Absences"
)]
#[instrument(skip(state))]
pub async fn get_absences(
    State(state): State<AppState>,
    Query(params): Query<AbsenceQueryParams>,
) -> Result<Json<Vec<Absence>>, AppError> {
    let absences = AbsenceService::get_absences(&state.db, &params).await?;
    Ok(Json(absences))
}

#[utoipa::path(
    get,
    path = "/api/absences/{id}",
    params(("id" = AbsenceId, Path, description = "Absence ID")),
    responses(
        (status = 200, description = "Absence details", body = Absence),
        (status = 404, description = "Absence not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Absences"
)]
#[instrument(skip(state))]
pub async fn get_absence(
    State(state): State<AppState>,
    Path(id): Path<AbsenceId>,
) -> Result<Json<Absence>, AppError> {
    let absence = AbsenceService::get_absence_by_id(&state.db, id).await?;
    Ok(Json(absence))
}

#[utoipa::path(
    put,
    path = "/api/absences/{id}/justification",
    params(("id" = AbsenceId, Path, description = "Absence ID")),
    request_body = JustifyAbsenceDto,
    responses(
        (status = 200, description = "Justification updated; returns the absence and the recomputed standing"),
        (status = 404, description = "Absence not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Absences"
)]
#[instrument(skip(state))]
pub async fn set_justification(
    State(state): State<AppState>,
    Path(id): Path<AbsenceId>,
    Json(dto): Json<JustifyAbsenceDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    dto.validate()
        .map_err(|e| AppError::unprocessable(anyhow::anyhow!("Validation failed: {}", e)))?;

    let (absence, record) =
        AbsenceService::set_justification(&state.db, &state.standing, id, dto).await?;
    Ok(Json(json!({
        "absence": absence,
        "unjustified_count": record.absence_count(),
        "eliminated": record.eliminated(),
    })))
}

#[utoipa::path(
    delete,
    path = "/api/absences/{id}",
    params(("id" = AbsenceId, Path, description = "Absence ID")),
    responses(
        (status = 200, description = "Absence deleted; standing recomputed"),
        (status = 404, description = "Absence not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Absences"
)]
#[instrument(skip(state))]
pub async fn delete_absence(
    State(state): State<AppState>,
    Path(id): Path<AbsenceId>,
) -> Result<Json<serde_json::Value>, AppError> {
    AbsenceService::delete_absence(&state.standing, id).await?;
    Ok(Json(json!({"message": "Absence deleted successfully"})))
}
