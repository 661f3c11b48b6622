//! Object storage abstraction for uploaded images.

use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;

use crate::{AppError, AppResult};

/// Storage configuration.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Local filesystem storage.
    Local {
        /// Base path for stored files.
        base_path: PathBuf,
        /// Base URL for serving files.
        base_url: String,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Local {
            base_path: PathBuf::from("./files"),
            base_url: "/files".to_string(),
        }
    }
}

impl StorageConfig {
    /// Build the backend described by this configuration.
    #[must_use]
    pub fn into_backend(self) -> Box<dyn StorageBackend> {
        match self {
            Self::Local {
                base_path,
                base_url,
            } => Box::new(LocalStorage::new(base_path, base_url)),
        }
    }
}

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path within the store).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// Hex-encoded SHA-256 of the content.
    pub sha256: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file. Never overwrites: an existing key is a `Conflict`.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Resolve a key below the base path, rejecting keys that escape it.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(AppError::Conflict(format!("Storage key already exists: {key}")));
            }
            Err(e) => return Err(AppError::Internal(format!("Failed to create file: {e}"))),
        };

        let written = match file.write_all(data).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            // Do not leave a truncated object behind the key
            let _ = tokio::fs::remove_file(&path).await;
            return Err(AppError::Internal(format!("Failed to write file: {e}")));
        }

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            sha256: hex::encode(Sha256::digest(data)),
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Internal(format!("Failed to delete file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to stat file: {e}")))
    }
}

/// Build the key for an uploaded image: `{bucket}/{user_id}/{unix_millis}.{extension}`.
#[must_use]
pub fn generate_storage_key(bucket: &str, user_id: &str, unix_millis: i64, extension: &str) -> String {
    format!("{bucket}/{user_id}/{unix_millis}.{extension}")
}
