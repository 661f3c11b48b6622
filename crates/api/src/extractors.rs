//! Request extractors.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
};
use ratenextdoor_common::AppError;
use ratenextdoor_core::Actor;
use serde::de::DeserializeOwned;

use crate::middleware::RequestContext;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.0.actor
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<RequestContext>);

impl MaybeAuthUser {
    #[must_use]
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref().map(|ctx| &ctx.actor)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<RequestContext>().cloned()))
    }
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        // Well-formed JSON that does not fit the expected type
        JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
        other => AppError::BadRequest(other.body_text()),
    }
}

fn query_rejection(rejection: QueryRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        Ok(Self(value))
    }
}

/// Query string extractor whose rejections use the API error shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(query_rejection)?;
        Ok(Self(value))
    }
}
