//! Forum vote repository.

use std::sync::Arc;

use crate::entities::{ForumPost, ForumVote, forum_post, forum_vote};
use chrono::Utc;
use ratenextdoor_common::{
    AppError, AppResult, VoteAction, VoteDirection, VoteState, transition,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, Set,
    TransactionTrait, sea_query::Expr,
};
use serde::Serialize;

/// Result of casting a vote, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub post_id: String,
    /// The voter's vote after the cast.
    pub state: VoteState,
    pub action: VoteAction,
    pub upvotes: i32,
    pub downvotes: i32,
}

impl VoteOutcome {
    #[must_use]
    pub const fn score(&self) -> i32 {
        self.upvotes - self.downvotes
    }
}

fn db_err(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}

/// Forum vote repository for database operations.
#[derive(Clone)]
pub struct ForumVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl ForumVoteRepository {
    /// Create a new forum vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's vote on a post.
    pub async fn find_by_user_and_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<forum_vote::Model>> {
        ForumVote::find()
            .filter(forum_vote::Column::UserId.eq(user_id))
            .filter(forum_vote::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// A user's votes on a set of posts (a post page and its replies).
    pub async fn find_by_user_and_posts(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> AppResult<Vec<forum_vote::Model>> {
        if post_ids.is_empty() {
            return Ok(vec![]);
        }

        ForumVote::find()
            .filter(forum_vote::Column::UserId.eq(user_id))
            .filter(forum_vote::Column::PostId.is_in(post_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Cast a vote and update the post's counters in one transaction.
    ///
    /// The post row is locked first, so concurrent casts on the same post
    /// apply one after another and the counters always match the vote rows.
    /// `vote_id` is used only when a new row has to be inserted.
    pub async fn cast_vote(
        &self,
        vote_id: String,
        user_id: &str,
        post_id: &str,
        direction: VoteDirection,
    ) -> AppResult<VoteOutcome> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let post = ForumPost::find_by_id(post_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))?;

        let existing = ForumVote::find()
            .filter(forum_vote::Column::UserId.eq(user_id))
            .filter(forum_vote::Column::PostId.eq(post_id))
            .one(&txn)
            .await
            .map_err(db_err)?;

        let current = VoteState::from(existing.as_ref().map(|v| VoteDirection::from(v.vote_type)));
        let step = transition(current, direction);

        match (existing, step.next.direction()) {
            (None, Some(next)) => {
                let model = forum_vote::ActiveModel {
                    id: Set(vote_id),
                    user_id: Set(user_id.to_string()),
                    post_id: Set(post_id.to_string()),
                    vote_type: Set(next.into()),
                    created_at: Set(Utc::now().into()),
                };
                ForumVote::insert(model)
                    .exec_without_returning(&txn)
                    .await
                    .map_err(db_err)?;
            }
            (Some(vote), Some(next)) => {
                ForumVote::update_many()
                    .col_expr(forum_vote::Column::VoteType, Expr::value(next.as_str()))
                    .filter(forum_vote::Column::Id.eq(vote.id))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
            }
            (Some(vote), None) => {
                ForumVote::delete_by_id(vote.id)
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;
            }
            (None, None) => {
                return Err(AppError::Internal(format!(
                    "vote transition from {current:?} produced no vote"
                )));
            }
        }

        ForumPost::update_many()
            .col_expr(
                forum_post::Column::Upvotes,
                Expr::col(forum_post::Column::Upvotes).add(step.delta.upvotes),
            )
            .col_expr(
                forum_post::Column::Downvotes,
                Expr::col(forum_post::Column::Downvotes).add(step.delta.downvotes),
            )
            .filter(forum_post::Column::Id.eq(post_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(
            post_id = %post_id,
            user_id = %user_id,
            action = ?step.action,
            "Vote cast"
        );

        Ok(VoteOutcome {
            post_id: post_id.to_string(),
            state: step.next,
            action: step.action,
            upvotes: post.upvotes + step.delta.upvotes,
            downvotes: post.downvotes + step.delta.downvotes,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::forum_vote::VoteType;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_post(upvotes: i32, downvotes: i32) -> forum_post::Model {
        let now = Utc::now();
        forum_post::Model {
            id: "p1".to_string(),
            user_id: "author".to_string(),
            parent_post_id: None,
            title: "Flood coverage".to_string(),
            slug: Some("flood-coverage-abcdef".to_string()),
            content: "Does anyone carry separate flood coverage?".to_string(),
            category: Some(forum_post::ForumCategory::Claims),
            image_urls: serde_json::json!([]),
            upvotes,
            downvotes,
            view_count: 0,
            reply_count: 0,
            is_pinned: false,
            is_locked: false,
            is_edited: false,
            edited_at: None,
            created_at: now.into(),
            last_activity_at: now.into(),
            updated_at: None,
        }
    }

    fn test_vote(vote_type: VoteType) -> forum_vote::Model {
        forum_vote::Model {
            id: "v1".to_string(),
            user_id: "voter".to_string(),
            post_id: "p1".to_string(),
            vote_type,
            created_at: Utc::now().into(),
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[tokio::test]
    async fn test_first_vote_is_added() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post(2, 1)]])
                .append_query_results([Vec::<forum_vote::Model>::new()])
                .append_exec_results([exec_ok(), exec_ok()])
                .into_connection(),
        );

        let repo = ForumVoteRepository::new(db.clone());
        let outcome = repo
            .cast_vote("v1".to_string(), "voter", "p1", VoteDirection::Up)
            .await
            .unwrap();

        assert_eq!(outcome.state, VoteState::Up);
        assert_eq!(outcome.action, VoteAction::Added);
        assert_eq!((outcome.upvotes, outcome.downvotes), (3, 1));
        assert_eq!(outcome.score(), 2);

        drop(repo);
        let log = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("INSERT INTO"));
    }

    #[tokio::test]
    async fn test_same_direction_removes_vote() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post(3, 1)]])
                .append_query_results([[test_vote(VoteType::Up)]])
                .append_exec_results([exec_ok(), exec_ok()])
                .into_connection(),
        );

        let repo = ForumVoteRepository::new(db.clone());
        let outcome = repo
            .cast_vote("unused".to_string(), "voter", "p1", VoteDirection::Up)
            .await
            .unwrap();

        assert_eq!(outcome.state, VoteState::None);
        assert_eq!(outcome.action, VoteAction::Removed);
        assert_eq!((outcome.upvotes, outcome.downvotes), (2, 1));

        drop(repo);
        let log = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());
        assert!(log.contains("DELETE FROM"));
        // Raw delta, no clamp
        assert!(log.contains(" + $"));
        assert!(!log.contains("GREATEST"));
    }

    #[tokio::test]
    async fn test_opposite_direction_flips_vote() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post(3, 1)]])
                .append_query_results([[test_vote(VoteType::Up)]])
                .append_exec_results([exec_ok(), exec_ok()])
                .into_connection(),
        );

        let repo = ForumVoteRepository::new(db);
        let outcome = repo
            .cast_vote("unused".to_string(), "voter", "p1", VoteDirection::Down)
            .await
            .unwrap();

        assert_eq!(outcome.state, VoteState::Down);
        assert_eq!(outcome.action, VoteAction::Updated);
        assert_eq!((outcome.upvotes, outcome.downvotes), (2, 2));
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<forum_post::Model>::new()])
                .into_connection(),
        );

        let repo = ForumVoteRepository::new(db);
        let result = repo
            .cast_vote("v1".to_string(), "voter", "missing", VoteDirection::Up)
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_user_and_posts_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ForumVoteRepository::new(db);
        let votes = repo.find_by_user_and_posts("voter", &[]).await.unwrap();

        assert!(votes.is_empty());
    }
}
