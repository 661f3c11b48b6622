//! Address geocoding endpoints.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use ratenextdoor_common::AppResult;
use ratenextdoor_core::{AddressSuggestion, ValidatedAddress};
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, ApiQuery, AuthUser},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Debug, Deserialize)]
pub struct ValidateAddressRequest {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,
}

async fn validate(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ValidateAddressRequest>,
) -> AppResult<ApiResponse<ValidatedAddress>> {
    let address = state.geocoding_service.validate_address(&req.address).await?;
    Ok(ApiResponse::ok(address))
}

async fn autocomplete(
    _user: AuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AutocompleteQuery>,
) -> AppResult<ApiResponse<Vec<AddressSuggestion>>> {
    let suggestions = state.geocoding_service.autocomplete(&query.q).await?;
    Ok(ApiResponse::ok(suggestions))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/validate", post(validate))
        .route("/autocomplete", get(autocomplete))
}
