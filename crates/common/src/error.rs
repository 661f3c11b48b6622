//! Error types for RateNextDoor.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Message shown to clients for any server-side failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Rate submission not found: {0}")]
    RateNotFound(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_)
            | Self::PostNotFound(_)
            | Self::RateNotFound(_)
            | Self::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::ExternalService(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::RateNotFound(_) => "RATE_NOT_FOUND",
            Self::ProfileNotFound(_) => "PROFILE_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message safe to show to the client.
    ///
    /// Server errors are collapsed into a generic message; their detail only
    /// goes to the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": self.public_message(),
            "code": code,
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let message = err
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .find_map(|e| e.message.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| err.to_string());
        Self::Validation(message)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Forbidden("not yours".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::PostNotFound("abc".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("Username is already taken".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = AppError::Database("relation \"forum_post\" does not exist".to_string());
        assert_eq!(err.public_message(), GENERIC_ERROR_MESSAGE);

        let err = AppError::Validation("Title must be at least 5 characters".to_string());
        assert_eq!(err.public_message(), "Title must be at least 5 characters");
    }
}
