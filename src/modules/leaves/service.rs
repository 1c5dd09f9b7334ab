use anyhow::Context;
use sqlx::PgPool;
use tracing::instrument;

use educore_models::{LeaveRequestId, LeaveStatus, TeacherStatus};

use crate::modules::leaves::model::{CreateLeaveRequestDto, LeaveQueryParams, LeaveRequest};
use crate::modules::teachers::service::TeacherService;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;

const LEAVE_COLUMNS: &str = "id, teacher_id, leave_type, start_date, end_date, reason, status, \
                             rejection_reason, cancellation_reason, created_at, updated_at";

pub struct LeaveService;

impl LeaveService {
    #[instrument(skip(db, dto))]
    pub async fn create_leave_request(
        db: &PgPool,
        dto: CreateLeaveRequestDto,
    ) -> Result<LeaveRequest, AppError> {
        if dto.end_date < dto.start_date {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Leave end date precedes start date"
            )));
        }

        TeacherService::get_teacher_by_id(db, dto.teacher_id).await?;

        let sql = format!(
            r#"INSERT INTO leave_requests (teacher_id, leave_type, start_date, end_date, reason)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {LEAVE_COLUMNS}"#
        );

        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(dto.teacher_id)
            .bind(dto.leave_type)
            .bind(dto.start_date)
            .bind(dto.end_date)
            .bind(&dto.reason)
            .fetch_one(db)
            .await
            .context("Failed to create leave request")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_leave_requests(
        db: &PgPool,
        params: &LeaveQueryParams,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let mut conditions = Vec::new();
        let mut idx = 0;
        if params.status.is_some() {
            idx += 1;
            conditions.push(format!("status = ${idx}"));
        }
        if params.teacher_id.is_some() {
            idx += 1;
            conditions.push(format!("teacher_id = ${idx}"));
        }
        let where_sql = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests {where_sql} ORDER BY created_at DESC"
        );

        let mut query = sqlx::query_as::<_, LeaveRequest>(&sql);
        if let Some(status) = params.status {
            query = query.bind(status);
        }
        if let Some(teacher_id) = params.teacher_id {
            query = query.bind(teacher_id);
        }

        query
            .fetch_all(db)
            .await
            .context("Failed to fetch leave requests")
            .map_err(AppError::database)
    }

    #[instrument(skip(db))]
    pub async fn get_leave_request_by_id(
        db: &PgPool,
        id: LeaveRequestId,
    ) -> Result<LeaveRequest, AppError> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = $1");

        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch leave request")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Leave request not found")))
    }

    /// Approve a pending request. The teacher's status flips to `on_leave`
    /// and an email goes out best-effort.
    #[instrument(skip(db, email))]
    pub async fn approve(
        db: &PgPool,
        email: &EmailService,
        id: LeaveRequestId,
    ) -> Result<LeaveRequest, AppError> {
        let leave = Self::get_leave_request_by_id(db, id).await?;
        if !leave.status.is_open() {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Only pending leave requests can be approved"
            )));
        }

        let leave = Self::set_status(db, id, LeaveStatus::Approved, None, None).await?;
        TeacherService::set_status(db, leave.teacher_id, TeacherStatus::OnLeave).await?;

        let teacher = TeacherService::get_teacher_by_id(db, leave.teacher_id).await?;
        let full_name = format!("{} {}", teacher.first_name, teacher.last_name);
        email
            .send_leave_approval(&teacher.email, &full_name, &leave)
            .await;

        Ok(leave)
    }

    /// Reject a pending request with a mandatory motive.
    #[instrument(skip(db, email, reason))]
    pub async fn reject(
        db: &PgPool,
        email: &EmailService,
        id: LeaveRequestId,
        reason: String,
    ) -> Result<LeaveRequest, AppError> {
        let leave = Self::get_leave_request_by_id(db, id).await?;
        if !leave.status.is_open() {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Only pending leave requests can be rejected"
            )));
        }

        let leave =
            Self::set_status(db, id, LeaveStatus::Rejected, Some(reason.clone()), None).await?;

        let teacher = TeacherService::get_teacher_by_id(db, leave.teacher_id).await?;
        let full_name = format!("{} {}", teacher.first_name, teacher.last_name);
        email
            .send_leave_rejection(&teacher.email, &full_name, &leave, &reason)
            .await;

        Ok(leave)
    }

    /// Cancel a pending or approved request. Cancelling an approved leave
    /// restores the teacher's `active` status.
    #[instrument(skip(db, email, reason))]
    pub async fn cancel(
        db: &PgPool,
        email: &EmailService,
        id: LeaveRequestId,
        reason: String,
    ) -> Result<LeaveRequest, AppError> {
        let leave = Self::get_leave_request_by_id(db, id).await?;
        let was_approved = match leave.status {
            LeaveStatus::Pending => false,
            LeaveStatus::Approved => true,
            LeaveStatus::Rejected | LeaveStatus::Cancelled => {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "Leave request is already settled"
                )));
            }
        };

        let leave =
            Self::set_status(db, id, LeaveStatus::Cancelled, None, Some(reason.clone())).await?;

        if was_approved {
            TeacherService::set_status(db, leave.teacher_id, TeacherStatus::Active).await?;
        }

        let teacher = TeacherService::get_teacher_by_id(db, leave.teacher_id).await?;
        let full_name = format!("{} {}", teacher.first_name, teacher.last_name);
        email
            .send_leave_cancellation(&teacher.email, &full_name, &leave, &reason)
            .await;

        Ok(leave)
    }

    async fn set_status(
        db: &PgPool,
        id: LeaveRequestId,
        status: LeaveStatus,
        rejection_reason: Option<String>,
        cancellation_reason: Option<String>,
    ) -> Result<LeaveRequest, AppError> {
        let sql = format!(
            r#"UPDATE leave_requests
               SET status = $2,
                   rejection_reason = COALESCE($3, rejection_reason),
                   cancellation_reason = COALESCE($4, cancellation_reason),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {LEAVE_COLUMNS}"#
        );

        sqlx::query_as::<_, LeaveRequest>(&sql)
            .bind(id)
            .bind(status)
            .bind(&rejection_reason)
            .bind(&cancellation_reason)
            .fetch_one(db)
            .await
            .context("Failed to update leave request status")
            .map_err(AppError::database)
    }
}
