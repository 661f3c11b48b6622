//! Username availability endpoints.
//!
//! These answer in their own shapes (`{"available": ..}` and
//! `{"suggestions": [..]}`) rather than the `data` envelope, since the
//! onboarding form polls them directly.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ratenextdoor_common::{AppError, AppResult};
use serde::Deserialize;
use serde_json::json;

use crate::{extractors::ApiJson, middleware::AppState};

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub username: String,
}

async fn check(State(state): State<AppState>, ApiJson(req): ApiJson<CheckRequest>) -> Response {
    match state.username_service.check(req.username.trim()).await {
        Ok(available) => Json(json!({ "available": available })).into_response(),
        Err(AppError::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "available": false, "error": message })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn suggestions(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let suggestions = state.username_service.suggest().await?;
    Ok(Json(json!({ "suggestions": suggestions })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check", post(check))
        .route("/suggestions", get(suggestions))
}
