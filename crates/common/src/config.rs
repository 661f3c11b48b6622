//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::storage::StorageConfig;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Identity provider configuration.
    pub auth: AuthConfig,
    /// Forward geocoding configuration.
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Uploaded file storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the site, used to build redirects.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Identity provider (GoTrue-compatible) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the auth service, without the `/auth/v1` suffix.
    pub url: String,
    /// Public API key sent with every request.
    pub anon_key: String,
    /// Name of the cookie carrying the access token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

/// Forward geocoding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    /// API access token. Address validation is unavailable without one.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Base URL of the geocoding API.
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
    /// ISO country filter applied to every lookup.
    #[serde(default = "default_country")]
    pub country: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: default_geocoding_url(),
            country: default_country(),
        }
    }
}

/// Storage settings as they appear in configuration files.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Base path for stored files.
    #[serde(default = "default_storage_path")]
    pub base_path: PathBuf,
    /// Base URL for serving files.
    #[serde(default = "default_storage_url")]
    pub base_url: String,
    /// Request body limit for upload endpoints.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            base_path: default_storage_path(),
            base_url: default_storage_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl From<StorageSettings> for StorageConfig {
    fn from(settings: StorageSettings) -> Self {
        Self::Local {
            base_path: settings.base_path,
            base_url: settings.base_url,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_cookie_name() -> String {
    "sb-access-token".to_string()
}

fn default_geocoding_url() -> String {
    "https://api.mapbox.com".to_string()
}

fn default_country() -> String {
    "US".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./files")
}

fn default_storage_url() -> String {
    "/files".to_string()
}

const fn default_max_upload_bytes() -> usize {
    6 * 1024 * 1024
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `RATENEXTDOOR_ENV`)
    /// 4. Environment variables with `RATENEXTDOOR_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("RATENEXTDOOR_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RATENEXTDOOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("RATENEXTDOOR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_sections() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                url = "http://localhost:3000"

                [database]
                url = "postgres://localhost/ratenextdoor"

                [auth]
                url = "http://localhost:9999"
                anon_key = "anon"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.cookie_name, "sb-access-token");
        assert_eq!(config.geocoding.country, "US");
        assert!(config.geocoding.access_token.is_none());
        assert_eq!(config.storage.base_url, "/files");
    }
}
