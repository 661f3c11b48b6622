//! Rate submission endpoints.

use axum::{
    Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::Utc;
use ratenextdoor_common::AppResult;
use ratenextdoor_core::{PublicRate, RateView, SubmitRateInput, UpdateRateInput};

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Public submissions for the map. Locations are fuzzed.
async fn public_rates(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<PublicRate>>> {
    let rates = state.rate_service.public_rates().await?;
    Ok(ApiResponse::ok(rates))
}

async fn my_rates(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<RateView>>> {
    let rates = state.rate_service.my_rates(user.actor()).await?;
    Ok(ApiResponse::ok(rates))
}

async fn submit(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SubmitRateInput>,
) -> AppResult<ApiResponse<RateView>> {
    let today = Utc::now().date_naive();
    let rate = state.rate_service.submit(user.actor(), input, today).await?;
    Ok(ApiResponse::created(rate))
}

async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(rate_id): Path<String>,
    ApiJson(input): ApiJson<UpdateRateInput>,
) -> AppResult<ApiResponse<RateView>> {
    let today = Utc::now().date_naive();
    let rate = state
        .rate_service
        .update(user.actor(), &rate_id, input, today)
        .await?;
    Ok(ApiResponse::ok(rate))
}

async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(rate_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.rate_service.delete(user.actor(), &rate_id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(submit))
        .route("/public", get(public_rates))
        .route("/mine", get(my_rates))
        .route("/{id}", patch(update).delete(delete))
}
