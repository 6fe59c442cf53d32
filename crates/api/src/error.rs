//! Unified error handling for the API.
//!
//! Domain failures are caught at the boundary and translated to the response
//! envelope; nothing propagates as an unhandled fault.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::ApiResponse;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Malformed or duplicate input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Inactive account or insufficient role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// OTP cooldown window not elapsed.
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// OTP mismatch, already consumed, or past its expiry.
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_))
            && !matches!(
                self,
                Self::Database(RepositoryError::NotFound | RepositoryError::Conflict(_))
            )
        {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_))
            | Self::Validation(_)
            | Self::InvalidOrExpiredOtp => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::TooManyRequests(msg) => msg.clone(),
            Self::InvalidOrExpiredOtp => "Invalid or expired OTP".to_string(),
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("user 123".to_string());
        assert_eq!(err.to_string(), "Not found: user 123");

        let err = AppError::Validation("invalid input".to_string());
        assert_eq!(err.to_string(), "Validation failed: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::TooManyRequests("test".to_string())),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_otp_failures_surface_as_bad_request() {
        // A failed OTP check is a 400, never a 401/404
        assert_eq!(get_status(AppError::InvalidOrExpiredOtp), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_repository_conflict_is_validation() {
        let err = AppError::Database(RepositoryError::Conflict(
            "A user with this email already exists.".to_string(),
        ));
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        let err = AppError::Database(RepositoryError::NotFound);
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
    }
}
