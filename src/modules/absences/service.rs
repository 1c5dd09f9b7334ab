use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use educore_models::AbsenceId;
use educore_standing::GradeRecord;

use crate::metrics::track_absence_event;
use crate::modules::absences::model::{
    Absence, AbsenceQueryParams, JustifyAbsenceDto, RecordAbsenceDto,
};
use crate::modules::standing::Standing;
use crate::utils::errors::AppError;

const ABSENCE_COLUMNS: &str =
    "id, student_id, course_id, teacher_id, date, justified, reason, created_at, updated_at";

pub struct AbsenceService;

impl AbsenceService {
    /// Record an absence through the standing engine, then read the stored
    /// row back for the response.
    #[instrument(skip(db, standing))]
    pub async fn record_absence(
        db: &PgPool,
        standing: &Standing,
        dto: RecordAbsenceDto,
    ) -> Result<Absence, AppError> {
        let event = standing
            .record_absence(
                dto.student_id,
                dto.course_id,
                dto.teacher_id,
                dto.date,
                dto.justified,
                dto.reason,
            )
            .await
            .map_err(AppError::standing)?;
        track_absence_event("recorded");

        Self::get_absence_by_id(db, event.id).await
    }

    #[instrument(skip(db))]
    pub async fn get_absence_by_id(db: &PgPool, id: AbsenceId) -> Result<Absence, AppError> {
        let sql = format!("SELECT {ABSENCE_COLUMNS} FROM absences WHERE id = $1 AND deleted = FALSE");

        sqlx::query_as::<_, Absence>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch absence")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Absence not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_absences(
        db: &PgPool,
        params: &AbsenceQueryParams,
    ) -> Result<Vec<Absence>, AppError> {
        let mut conditions = vec!["deleted = FALSE".to_string()];
        let mut idx = 0;
        if params.student_id.is_some() {
            idx += 1;
            conditions.push(format!("student_id = ${idx}"));
        }
        if params.course_id.is_some() {
            idx += 1;
            conditions.push(format!("course_id = ${idx}"));
        }
        if params.teacher_id.is_some() {
            idx += 1;
            conditions.push(format!("teacher_id = ${idx}"));
        }
        if params.justified.is_some() {
            idx += 1;
            conditions.push(format!("justified = ${idx}"));
        }

        let sql = format!(
            "SELECT {ABSENCE_COLUMNS} FROM absences WHERE {} ORDER BY date DESC",
            conditions.join(" AND ")
        );

        let mut query = sqlx::query_as::<_, Absence>(&sql);
        if let Some(student_id) = params.student_id {
            query = query.bind(student_id);
        }
        if let Some(course_id) = params.course_id {
            query = query.bind(course_id);
        }
        if let Some(teacher_id) = params.teacher_id {
            query = query.bind(teacher_id);
        }
        if let Some(justified) = params.justified {
            query = query.bind(justified);
        }

        query
            .fetch_all(db)
            .await
            .context("Failed to fetch absences")
            .map_err(AppError::database)
    }

    /// Flip the justified flag and rerun the standing chain. Returns the
    /// updated absence and the recomputed grade record.
    #[instrument(skip(db, standing))]
    pub async fn set_justification(
        db: &PgPool,
        standing: &Standing,
        id: AbsenceId,
        dto: JustifyAbsenceDto,
    ) -> Result<(Absence, GradeRecord), AppError> {
        let record = standing
            .set_absence_justification(id, dto.justified, dto.reason)
            .await
            .map_err(AppError::standing)?;
        track_absence_event("justification_changed");

        let absence = Self::get_absence_by_id(db, id).await?;
        Ok((absence, record))
    }

    #[instrument(skip(standing))]
    pub async fn delete_absence(standing: &Standing, id: AbsenceId) -> Result<(), AppError> {
        standing
            .delete_absence(id)
            .await
            .map_err(AppError::standing)?;
        track_absence_event("deleted");
        Ok(())
    }
}
