//! Profile repository.

use std::sync::Arc;

use crate::entities::{Profile, profile};
use ratenextdoor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    SqlErr, sea_query::OnConflict,
};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

fn map_write_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => unique_violation_err(&detail),
        _ => AppError::Database(e.to_string()),
    }
}

/// Only the `username` unique index is a user-facing conflict. Any other
/// unique violation (the primary key included) is a database error.
fn unique_violation_err(detail: &str) -> AppError {
    if detail.contains("username") {
        AppError::Conflict("Username is already taken".to_string())
    } else {
        AppError::Database(detail.to_string())
    }
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by user ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by user ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<profile::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(id.to_string()))
    }

    /// Find profiles by IDs (authors of a page of posts).
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<profile::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Profile::find()
            .filter(profile::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a profile by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<profile::Model>> {
        Profile::find()
            .filter(profile::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a username is held by a profile other than `except_id`.
    pub async fn is_username_taken(
        &self,
        username: &str,
        except_id: Option<&str>,
    ) -> AppResult<bool> {
        let mut query = Profile::find().filter(profile::Column::Username.eq(username));

        if let Some(id) = except_id {
            query = query.filter(profile::Column::Id.ne(id));
        }

        let holder = query
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(holder.is_some())
    }

    /// Create a new profile.
    pub async fn create(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_err)
    }

    /// Insert a profile unless one with the same ID exists, then return the
    /// stored row. The flag is false when a concurrent insert got there first.
    pub async fn create_if_absent(
        &self,
        model: profile::ActiveModel,
    ) -> AppResult<(profile::Model, bool)> {
        let id = model
            .id
            .clone()
            .take()
            .ok_or_else(|| AppError::Internal("Profile insert without id".to_string()))?;

        let inserted = Profile::insert(model)
            .on_conflict(
                OnConflict::column(profile::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(map_write_err)?;

        let stored = self.get_by_id(&id).await?;
        Ok((stored, inserted > 0))
    }

    /// Update a profile.
    pub async fn update(&self, model: profile::ActiveModel) -> AppResult<profile::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::profile::ProfileRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_profile(id: &str, username: Option<&str>) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            username: username.map(ToString::to_string),
            display_name: None,
            full_name: None,
            date_of_birth: None,
            phone: None,
            avatar_url: None,
            is_anonymous: false,
            role: ProfileRole::Member,
            onboarding_completed: false,
            email_verified: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let profile = create_test_profile("u1", Some("quick_fox"));

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db);
        let found = repo.find_by_username("quick_fox").await.unwrap().unwrap();

        assert_eq!(found.id, "u1");
    }

    #[tokio::test]
    async fn test_find_by_ids_empty_skips_query() {
        // No query results queued: a query would fail
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ProfileRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_only_username_violation_is_a_conflict() {
        let taken = unique_violation_err(
            "duplicate key value violates unique constraint \"profile_username_key\"",
        );
        assert!(matches!(taken, AppError::Conflict(_)));

        let pkey = unique_violation_err(
            "duplicate key value violates unique constraint \"profile_pkey\"",
        );
        assert!(matches!(pkey, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_create_if_absent_returns_existing_row_on_race() {
        let winner = create_test_profile("u1", None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .append_query_results([[winner]])
                .into_connection(),
        );

        let repo = ProfileRepository::new(db.clone());
        let model = profile::ActiveModel {
            id: Set("u1".to_string()),
            role: Set(ProfileRole::Member),
            ..Default::default()
        };
        let (stored, inserted) = repo.create_if_absent(model).await.unwrap();

        assert_eq!(stored.id, "u1");
        assert!(!inserted);

        drop(repo);
        let log = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("DO NOTHING"));
    }

    #[test]
    fn test_public_name() {
        let mut profile = create_test_profile("u1", Some("quick_fox"));
        assert_eq!(profile.public_name(), "quick_fox");

        profile.is_anonymous = true;
        assert_eq!(profile.public_name(), "Anonymous");

        profile.is_anonymous = false;
        profile.username = None;
        assert_eq!(profile.public_name(), "Member");
    }
}
