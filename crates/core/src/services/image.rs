//! Forum image uploads.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use ratenextdoor_common::{AppError, AppResult, StorageBackend, generate_storage_key};
use serde::Serialize;

use crate::Actor;
use crate::validation;

/// Storage bucket (key prefix) for forum images.
pub const FORUM_IMAGE_BUCKET: &str = "forum-images";

/// Attempts at finding a free key when uploads land in the same millisecond.
const KEY_ATTEMPTS: i64 = 3;

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub key: String,
    pub size: u64,
    pub content_type: String,
}

/// Image service.
#[derive(Clone)]
pub struct ImageService {
    storage: Arc<dyn StorageBackend>,
}

impl ImageService {
    #[must_use]
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Validate and store an image for use in a post.
    pub async fn upload(
        &self,
        actor: &Actor,
        content_type: &str,
        data: Bytes,
    ) -> AppResult<UploadedImage> {
        let extension = validation::validate_image(content_type, data.len())?;

        let millis = Utc::now().timestamp_millis();
        for offset in 0..KEY_ATTEMPTS {
            let key =
                generate_storage_key(FORUM_IMAGE_BUCKET, &actor.user_id, millis + offset, extension);
            let file = match self.storage.upload(&key, &data, content_type).await {
                Ok(file) => file,
                Err(AppError::Conflict(_)) => {
                    tracing::debug!(key = %key, "Storage key taken, trying next");
                    continue;
                }
                Err(e) => return Err(e),
            };

            tracing::debug!(key = %file.key, size = file.size, sha256 = %file.sha256, "Image stored");

            return Ok(UploadedImage {
                url: file.url,
                key: file.key,
                size: file.size,
                content_type: file.content_type,
            });
        }

        Err(AppError::Conflict(
            "Upload collided with an existing file. Please retry.".to_string(),
        ))
    }
}
