//! Auth redirect endpoints.
//!
//! Sign-in itself happens at the identity provider. These routes finish the
//! redirect flows by turning a code or emailed token into a session cookie.

use axum::{
    Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use ratenextdoor_core::{OtpType, Session};
use serde::Deserialize;

use crate::middleware::AppState;

const DEFAULT_NEXT: &str = "/dashboard";
const ONBOARDING_PATH: &str = "/onboarding";
const OAUTH_FAILED: &str = "/auth/signin?error=oauth_failed";
const VERIFICATION_FAILED: &str = "/auth/signin?error=verification_failed";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub token_hash: Option<String>,
    #[serde(rename = "type")]
    pub otp_type: Option<OtpType>,
    pub next: Option<String>,
}

/// Only same-site absolute paths are honoured as redirect targets.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DEFAULT_NEXT,
    }
}

/// Name of the cookie holding the PKCE verifier for the OAuth flow.
fn verifier_cookie(session_cookie: &str) -> String {
    format!("{session_cookie}-code-verifier")
}

fn set_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}{secure}")
}

fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}

fn session_cookie(state: &AppState, session: &Session) -> String {
    set_cookie(
        &state.session_cookie,
        &session.access_token,
        session.expires_in.unwrap_or(3600),
        state.secure_cookies,
    )
}

/// `GET /auth/callback`: finish the OAuth code flow.
async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        return Redirect::to(OAUTH_FAILED).into_response();
    };

    let verifier_name = verifier_cookie(&state.session_cookie);
    let verifier = jar.get(&verifier_name).map(|c| c.value().to_string());

    let session = match state.identity.exchange_code(code, verifier.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "OAuth code exchange failed");
            return Redirect::to(OAUTH_FAILED).into_response();
        }
    };

    let profile = match state.profile_service.ensure_profile(&session.user).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(error = %e, user_id = %session.user.id, "Failed to provision profile");
            return Redirect::to(OAUTH_FAILED).into_response();
        }
    };

    let target = if profile.onboarding_completed {
        safe_next(query.next.as_deref())
    } else {
        ONBOARDING_PATH
    };

    tracing::info!(user_id = %profile.id, target = %target, "Signed in via OAuth");

    (
        AppendHeaders([
            (header::SET_COOKIE, session_cookie(&state, &session)),
            (header::SET_COOKIE, clear_cookie(&verifier_name, state.secure_cookies)),
        ]),
        Redirect::to(target),
    )
        .into_response()
}

/// `GET /auth/confirm`: finish an emailed confirmation link.
async fn confirm(State(state): State<AppState>, Query(query): Query<ConfirmQuery>) -> Response {
    let (Some(token_hash), Some(otp_type)) = (query.token_hash.as_deref(), query.otp_type) else {
        return Redirect::to(VERIFICATION_FAILED).into_response();
    };

    let session = match state.identity.verify_otp(token_hash, otp_type).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, otp_type = ?otp_type, "Email verification failed");
            return Redirect::to(VERIFICATION_FAILED).into_response();
        }
    };

    // Records the now-verified email on the profile.
    if let Err(e) = state.profile_service.ensure_profile(&session.user).await {
        tracing::error!(error = %e, user_id = %session.user.id, "Failed to provision profile");
        return Redirect::to(VERIFICATION_FAILED).into_response();
    }

    (
        AppendHeaders([(header::SET_COOKIE, session_cookie(&state, &session))]),
        Redirect::to(safe_next(query.next.as_deref())),
    )
        .into_response()
}

/// `POST /auth/signout`: revoke the session and clear the cookie.
async fn signout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = jar.get(&state.session_cookie).map(|c| c.value().to_string()) {
        if let Err(e) = state.identity.sign_out(&token).await {
            tracing::warn!(error = %e, "Identity provider sign out failed");
        }
    }

    (
        StatusCode::NO_CONTENT,
        AppendHeaders([(
            header::SET_COOKIE,
            clear_cookie(&state.session_cookie, state.secure_cookies),
        )]),
    )
        .into_response()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/callback", get(callback))
        .route("/confirm", get(confirm))
        .route("/signout", post(signout))
}
