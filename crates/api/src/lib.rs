//! HTTP API layer for RateNextDoor.
//!
//! This crate provides the JSON API and the auth redirect routes:
//!
//! - **Endpoints**: forum, rates, geocoding, profile, usernames
//! - **Auth**: OAuth callback, email confirmation and sign-out redirects
//! - **Extractors**: Authenticated and optional callers
//! - **Middleware**: Session resolution from bearer token or cookie
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::{auth_router, health_router, router};
pub use middleware::{AppState, RequestContext, auth_middleware};

/// Assemble the full application: `/api` behind session resolution, the
/// `/auth` redirect routes and `/health`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            router().layer(from_fn_with_state(state.clone(), auth_middleware)),
        )
        .nest("/auth", auth_router())
        .merge(health_router())
        .with_state(state)
}
