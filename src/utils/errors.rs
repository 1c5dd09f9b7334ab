use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use educore_standing::StandingError;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// Map a standing-engine error onto the HTTP taxonomy. Validation and
    /// lookup failures are client errors; only a storage failure becomes a
    /// 500.
    pub fn standing(err: StandingError) -> Self {
        let status = match &err {
            StandingError::InvalidScore(_) | StandingError::InvalidAbsenceDate(_) => {
                StatusCode::BAD_REQUEST
            }
            StandingError::StudentNotFound(_)
            | StandingError::CourseNotFound(_)
            | StandingError::AbsenceNotFound(_) => StatusCode::NOT_FOUND,
            StandingError::ForbiddenAssociation { .. } => StatusCode::FORBIDDEN,
            StandingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.to_string()
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use educore_models::{CourseId, StudentId, TeacherId};

    #[test]
    fn standing_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::standing(StandingError::InvalidScore(25.0)).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::standing(StandingError::StudentNotFound(StudentId::new())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::standing(StandingError::ForbiddenAssociation {
                teacher: TeacherId::new(),
                course: CourseId::new(),
            })
            .status,
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn store_failure_is_a_server_error() {
        let err = StandingError::Store(educore_standing::StoreError("connection reset".into()));
        assert_eq!(
            AppError::standing(err).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
