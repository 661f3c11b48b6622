//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use ratenextdoor_common::AppError;
use ratenextdoor_core::{
    Actor, DashboardService, ForumService, GeocodingService, IdentityService, ImageService,
    ProfileService, RateService, UsernameService, VoteService,
};
use ratenextdoor_db::entities::profile;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub profile_service: ProfileService,
    pub forum_service: ForumService,
    pub vote_service: VoteService,
    pub rate_service: RateService,
    pub image_service: ImageService,
    pub geocoding_service: GeocodingService,
    pub username_service: UsernameService,
    pub dashboard_service: DashboardService,
    /// Name of the session cookie.
    pub session_cookie: String,
    /// Mark cookies `Secure` (HTTPS deployments).
    pub secure_cookies: bool,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub actor: Actor,
    pub profile: profile::Model,
    pub access_token: String,
}

/// Session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(req: &Request<Body>, cookie_name: &str) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(req.headers())
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
///
/// Resolves the session into a [`RequestContext`] extension, provisioning
/// the caller's profile on first sight. Requests without a valid session
/// pass through unauthenticated.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = session_token(&req, &state.session_cookie) else {
        return next.run(req).await;
    };

    let user = match state.identity.get_user(&token).await {
        Ok(user) => user,
        Err(AppError::Unauthorized) => {
            tracing::debug!("Ignoring invalid or expired session token");
            return next.run(req).await;
        }
        Err(e) => return e.into_response(),
    };

    let profile = match state.profile_service.ensure_profile(&user).await {
        Ok(profile) => profile,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(RequestContext {
        actor: Actor::from(&profile),
        profile,
        access_token: token,
    });

    next.run(req).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Bearer header-token")
            .header(header::COOKIE, "sb-access-token=cookie-token")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            session_token(&req, "sb-access-token").as_deref(),
            Some("header-token")
        );
    }

    #[test]
    fn test_cookie_token() {
        let req = Request::builder()
            .header(header::COOKIE, "theme=dark; sb-access-token=cookie-token")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            session_token(&req, "sb-access-token").as_deref(),
            Some("cookie-token")
        );
        assert!(session_token(&req, "other").is_none());
    }

    #[test]
    fn test_empty_bearer_is_ignored() {
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Bearer ")
            .body(Body::empty())
            .unwrap();

        assert!(session_token(&req, "sb-access-token").is_none());
    }
}
