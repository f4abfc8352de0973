use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::domain::errors::DispatchError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unprocessable(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Unprocessable(msg) => write!(f, "Unprocessable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::JobNotFound(_) | DispatchError::NoActiveJob => {
                ApiError::NotFound(err.to_string())
            }
            DispatchError::InvalidTransition { .. } | DispatchError::JobAlreadyActive(_) => {
                ApiError::Conflict(err.to_string())
            }
            DispatchError::OtpMismatch => ApiError::Unprocessable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::JobStatus;

    #[test]
    fn test_dispatch_errors_map_to_status_codes() {
        let cases = [
            (DispatchError::JobNotFound("JOB-1".into()), StatusCode::NOT_FOUND),
            (DispatchError::NoActiveJob, StatusCode::NOT_FOUND),
            (
                DispatchError::InvalidTransition {
                    from: JobStatus::Arrived,
                    event: "arrive",
                },
                StatusCode::CONFLICT,
            ),
            (DispatchError::JobAlreadyActive("JOB-1".into()), StatusCode::CONFLICT),
            (DispatchError::OtpMismatch, StatusCode::UNPROCESSABLE_ENTITY),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
