//! Teacher leave-request models and DTOs.
//!
//! A request moves `pending -> approved | rejected`, and an approved request
//! can still be `cancelled`. Approval flips the teacher's status to
//! `on_leave`; cancelling an approved request restores `active`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{LeaveRequestId, TeacherId};
use crate::macros::text_enum;

text_enum!(
    /// Workflow state of a leave request.
    LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
);

text_enum!(
    /// Category of leave being requested.
    LeaveType {
        Annual => "annual",
        Sick => "sick",
        Maternity => "maternity",
        Unpaid => "unpaid",
    }
);

impl LeaveStatus {
    /// Whether the request can still be approved or rejected.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A leave-of-absence request filed by a teacher.
#[derive(Serialize, FromRow, Debug, ToSchema)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub teacher_id: TeacherId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub rejection_reason: Option<String>,
    pub cancellation_reason: Option<String>,
    #[sqlx(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sqlx(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for filing a new leave request.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct CreateLeaveRequestDto {
    pub teacher_id: TeacherId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// DTO carrying the mandatory motive for a rejection or cancellation.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct LeaveDecisionDto {
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

/// Query parameters for listing leave requests.
#[derive(Deserialize, Debug, Default, IntoParams)]
pub struct LeaveQueryParams {
    pub status: Option<LeaveStatus>,
    pub teacher_id: Option<TeacherId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_open() {
        assert!(LeaveStatus::Pending.is_open());
        assert!(!LeaveStatus::Approved.is_open());
        assert!(!LeaveStatus::Rejected.is_open());
        assert!(!LeaveStatus::Cancelled.is_open());
    }

    #[test]
    fn status_text_roundtrip() {
        for status in [
            LeaveStatus::Pending,
            LeaveStatus::Approved,
            LeaveStatus::Rejected,
            LeaveStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<LeaveStatus>().unwrap(), status);
        }
    }

    #[test]
    fn decision_reason_is_mandatory() {
        let dto = LeaveDecisionDto {
            reason: String::new(),
        };
        assert!(dto.validate().is_err());
    }
}
