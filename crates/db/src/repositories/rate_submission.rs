//! Rate submission repository.

use std::sync::Arc;

use crate::entities::{RateSubmission, rate_submission};
use ratenextdoor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Upper bound on rows returned for the public map.
pub const PUBLIC_MAP_LIMIT: u64 = 5000;

/// Rate submission repository for database operations.
#[derive(Clone)]
pub struct RateSubmissionRepository {
    db: Arc<DatabaseConnection>,
}

impl RateSubmissionRepository {
    /// Create a new rate submission repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a submission by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<rate_submission::Model>> {
        RateSubmission::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a submission by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<rate_submission::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RateNotFound(id.to_string()))
    }

    /// Create a new submission.
    pub async fn create(
        &self,
        model: rate_submission::ActiveModel,
    ) -> AppResult<rate_submission::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a submission.
    pub async fn update(
        &self,
        model: rate_submission::ActiveModel,
    ) -> AppResult<rate_submission::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a submission.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        RateSubmission::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// A user's submissions, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<rate_submission::Model>> {
        RateSubmission::find()
            .filter(rate_submission::Column::UserId.eq(user_id))
            .order_by_desc(rate_submission::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Submissions shown on the public map.
    pub async fn find_public(&self) -> AppResult<Vec<rate_submission::Model>> {
        RateSubmission::find()
            .filter(rate_submission::Column::VisibleToPublic.eq(true))
            .order_by_desc(rate_submission::Column::CreatedAt)
            .limit(PUBLIC_MAP_LIMIT)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
