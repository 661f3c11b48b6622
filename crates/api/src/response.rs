//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response wrapper: `{"data": ...}`.
///
/// Errors never go through this type; they are rendered by
/// [`ratenextdoor_common::AppError`].
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// Create a `201 Created` response.
    pub const fn created(data: T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
