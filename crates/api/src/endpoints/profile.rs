//! Profile, onboarding and dashboard endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use chrono::Utc;
use ratenextdoor_common::AppResult;
use ratenextdoor_core::{Dashboard, OnboardingInput, ProfileResponse, UserPosts};
use ratenextdoor_db::entities::profile::ProfileRole;
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: ProfileRole,
}

/// The caller's profile.
async fn me(user: AuthUser) -> ApiResponse<ProfileResponse> {
    ApiResponse::ok(user.0.profile.into())
}

async fn onboarding(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<OnboardingInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let today = Utc::now().date_naive();
    let profile = state
        .profile_service
        .complete_onboarding(user.actor(), input, today)
        .await?;
    Ok(ApiResponse::ok(profile.into()))
}

async fn dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Dashboard>> {
    let dashboard = state.dashboard_service.load(user.actor()).await?;
    Ok(ApiResponse::ok(dashboard))
}

/// The caller's own posts and replies.
async fn my_posts(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserPosts>> {
    let posts = state.forum_service.user_posts(user.actor()).await?;
    Ok(ApiResponse::ok(posts))
}

async fn set_role(
    user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<SetRoleRequest>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let profile = state
        .profile_service
        .set_role(user.actor(), &user_id, req.role)
        .await?;
    Ok(ApiResponse::ok(profile.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me/posts", get(my_posts))
        .route("/onboarding", post(onboarding))
        .route("/dashboard", get(dashboard))
        .route("/admin/users/{id}/role", put(set_role))
}
