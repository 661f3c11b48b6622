//! Identity provider access.
//!
//! Authentication itself happens in an external GoTrue-compatible service.
//! This module only resolves access tokens to users and completes the two
//! redirect flows (OAuth code exchange and email OTP confirmation).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use ratenextdoor_common::{AppError, AppResult, config::AuthConfig};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

/// Statuses meaning the presented access token is not valid.
const TOKEN_REJECTED: &[StatusCode] = &[StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN];

/// Statuses meaning an OAuth code or OTP token hash is not valid (bad or
/// expired grant, unknown flow state, failed verifier check).
const GRANT_REJECTED: &[StatusCode] = &[
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
    StatusCode::UNPROCESSABLE_ENTITY,
];

/// Map a non-success provider answer. Only the listed statuses blame the
/// caller's credential; rate limiting and everything else is a provider
/// failure.
fn provider_error(status: StatusCode, rejected: &[StatusCode], context: &str, body: &str) -> AppError {
    if rejected.contains(&status) {
        tracing::debug!(%status, body = %body, context, "Identity provider rejected credential");
        AppError::Unauthorized
    } else {
        AppError::ExternalService(format!("{context}: {status} - {body}"))
    }
}

/// A user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
}

impl IdentityUser {
    #[must_use]
    pub const fn email_verified(&self) -> bool {
        self.email_confirmed_at.is_some()
    }
}

/// A session issued by the identity provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: IdentityUser,
}

/// Kind of one-time token sent by email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    Signup,
    Invite,
    Magiclink,
    Recovery,
    EmailChange,
    Email,
}

/// Identity provider operations used by the service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve an access token to its user.
    ///
    /// Returns [`AppError::Unauthorized`] for unknown or expired tokens.
    async fn get_user(&self, access_token: &str) -> AppResult<IdentityUser>;

    /// Exchange an OAuth authorization code for a session.
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> AppResult<Session>;

    /// Verify an emailed one-time token hash.
    async fn verify_otp(&self, token_hash: &str, otp_type: OtpType) -> AppResult<Session>;

    /// Revoke a session.
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
}

/// Wrapper for boxed `IdentityProvider` trait object.
pub type IdentityService = Arc<dyn IdentityProvider>;

/// GoTrue HTTP client.
#[derive(Clone)]
pub struct GoTrueClient {
    http_client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    /// Create a client for the configured auth service.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        let base = Url::parse(&config.url)
            .map_err(|e| AppError::Config(format!("Invalid auth url '{}': {e}", config.url)))?;

        Ok(Self {
            http_client,
            base_url: format!("{}/auth/v1", base.as_str().trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn read_session(response: reqwest::Response, flow: &str) -> AppResult<Session> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(
                status,
                GRANT_REJECTED,
                &format!("Auth {flow} failed"),
                &body,
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse auth session: {e}")))
    }
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    async fn get_user(&self, access_token: &str) -> AppResult<IdentityUser> {
        let response = self
            .http_client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Auth request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(
                status,
                TOKEN_REJECTED,
                "Auth user lookup failed",
                &body,
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse auth user: {e}")))
    }

    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> AppResult<Session> {
        let response = self
            .http_client
            .post(self.endpoint("token?grant_type=pkce"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "auth_code": code,
                "code_verifier": code_verifier,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Auth request failed: {e}")))?;

        Self::read_session(response, "code exchange").await
    }

    async fn verify_otp(&self, token_hash: &str, otp_type: OtpType) -> AppResult<Session> {
        let response = self
            .http_client
            .post(self.endpoint("verify"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "type": otp_type,
                "token_hash": token_hash,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Auth request failed: {e}")))?;

        Self::read_session(response, "otp verification").await
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Auth request failed: {e}")))?;

        // An already-expired session is as good as signed out
        if response.status().is_success() || TOKEN_REJECTED.contains(&response.status()) {
            Ok(())
        } else {
            Err(AppError::ExternalService(format!(
                "Auth sign out failed: {}",
                response.status()
            )))
        }
    }
}

/// Fixed token-to-user table, for tests and local development.
#[derive(Clone, Default)]
pub struct StaticIdentityProvider {
    users: HashMap<String, IdentityUser>,
    codes: HashMap<String, String>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an access token for a user.
    #[must_use]
    pub fn with_user(mut self, access_token: &str, user: IdentityUser) -> Self {
        self.users.insert(access_token.to_string(), user);
        self
    }

    /// Register an OAuth code (or OTP token hash) that yields `access_token`.
    #[must_use]
    pub fn with_code(mut self, code: &str, access_token: &str) -> Self {
        self.codes.insert(code.to_string(), access_token.to_string());
        self
    }

    fn session_for_code(&self, code: &str) -> AppResult<Session> {
        let access_token = self.codes.get(code).ok_or(AppError::Unauthorized)?;
        let user = self
            .users
            .get(access_token)
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        Ok(Session {
            access_token: access_token.clone(),
            refresh_token: None,
            expires_in: Some(3600),
            user,
        })
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_user(&self, access_token: &str) -> AppResult<IdentityUser> {
        self.users
            .get(access_token)
            .cloned()
            .ok_or(AppError::Unauthorized)
    }

    async fn exchange_code(&self, code: &str, _code_verifier: Option<&str>) -> AppResult<Session> {
        self.session_for_code(code)
    }

    async fn verify_otp(&self, token_hash: &str, _otp_type: OtpType) -> AppResult<Session> {
        self.session_for_code(token_hash)
    }

    async fn sign_out(&self, _access_token: &str) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(id: &str) -> IdentityUser {
        IdentityUser {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            email_confirmed_at: Some("2026-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_only_credential_statuses_are_unauthorized() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            assert!(matches!(
                provider_error(status, TOKEN_REJECTED, "lookup", ""),
                AppError::Unauthorized
            ));
        }

        for status in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::BAD_REQUEST,
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::BAD_GATEWAY,
        ] {
            assert!(matches!(
                provider_error(status, TOKEN_REJECTED, "lookup", "slow down"),
                AppError::ExternalService(_)
            ));
        }
    }

    #[test]
    fn test_rate_limited_code_exchange_is_a_provider_failure() {
        assert!(matches!(
            provider_error(StatusCode::UNPROCESSABLE_ENTITY, GRANT_REJECTED, "exchange", ""),
            AppError::Unauthorized
        ));
        let limited = provider_error(StatusCode::TOO_MANY_REQUESTS, GRANT_REJECTED, "exchange", "");
        assert!(matches!(limited, AppError::ExternalService(ref m) if m.contains("429")));
    }

    #[tokio::test]
    async fn test_static_provider_resolves_tokens() {
        let provider = StaticIdentityProvider::new()
            .with_user("token-1", user("u1"))
            .with_code("code-1", "token-1");

        assert_eq!(provider.get_user("token-1").await.unwrap().id, "u1");
        assert!(matches!(
            provider.get_user("bogus").await,
            Err(AppError::Unauthorized)
        ));

        let session = provider.exchange_code("code-1", None).await.unwrap();
        assert_eq!(session.access_token, "token-1");
        assert!(session.user.email_verified());

        assert!(provider.verify_otp("nope", OtpType::Email).await.is_err());
    }

    #[test]
    fn test_gotrue_endpoint() {
        let client = GoTrueClient::new(&AuthConfig {
            url: "https://auth.example.com/".to_string(),
            anon_key: "anon".to_string(),
            cookie_name: "sb-access-token".to_string(),
        })
        .unwrap();

        assert_eq!(client.endpoint("user"), "https://auth.example.com/auth/v1/user");
    }

    #[test]
    fn test_gotrue_rejects_relative_url() {
        let result = GoTrueClient::new(&AuthConfig {
            url: "auth.example.com".to_string(),
            anon_key: "anon".to_string(),
            cookie_name: "sb-access-token".to_string(),
        });

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_otp_type_wire_names() {
        assert_eq!(
            serde_json::to_value(OtpType::EmailChange).unwrap(),
            serde_json::json!("email_change")
        );
        let parsed: OtpType = serde_json::from_str("\"magiclink\"").unwrap();
        assert_eq!(parsed, OtpType::Magiclink);
    }
}
