//! API endpoints.

mod auth;
mod forum;
mod geocode;
mod health;
mod profile;
mod rates;
mod username;

use axum::Router;

use crate::middleware::AppState;

/// Create the JSON API router, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(profile::router())
        .nest("/forum", forum::router())
        .nest("/rates", rates::router())
        .nest("/geocode", geocode::router())
        .nest("/username", username::router())
}

/// Create the auth redirect router, mounted under `/auth`.
pub fn auth_router() -> Router<AppState> {
    auth::router()
}

/// Create the health check router.
pub fn health_router() -> Router<AppState> {
    health::router()
}
