use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// The prober spent its whole retry budget.
    #[error("Database connection failed")]
    DatabaseUnavailable,

    /// A connection was opened but could not be released cleanly.
    #[error("Connection verification failed: {0}")]
    VerificationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body shared by every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseUnavailable
            | AppError::VerificationFailed(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
            AppError::VerificationFailed(_) => "VERIFICATION_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        // Always log the detailed error server-side
        tracing::error!(
            code = %self.code(),
            status = %status.as_u16(),
            message = %message,
            "API error"
        );

        let body = ErrorResponse {
            status: "error",
            message,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_response_contract() {
        assert_eq!(
            AppError::DatabaseUnavailable.to_string(),
            "Database connection failed"
        );
        assert_eq!(
            AppError::VerificationFailed("socket closed".into()).to_string(),
            "Connection verification failed: socket closed"
        );
    }

    #[test]
    fn test_all_errors_are_server_errors() {
        assert_eq!(
            AppError::DatabaseUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
