//! Forum post repository.

use std::sync::Arc;

use crate::entities::{
    ForumPost,
    forum_post::{self, ForumCategory},
};
use chrono::Utc;
use ratenextdoor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use serde::Deserialize;

/// Default page size of the forum index.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Ordering of the forum index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    /// Most recent activity (creation or reply) first.
    #[default]
    Latest,
    /// Most upvoted first.
    Popular,
    /// Most recently created first.
    New,
}

/// Filters for listing top-level posts.
#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    pub category: Option<ForumCategory>,
    pub sort: PostSort,
    /// Case-insensitive substring matched against title and content.
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: u64,
}

/// Escape `LIKE` metacharacters and wrap the term for a substring match.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Forum post repository for database operations.
#[derive(Clone)]
pub struct ForumPostRepository {
    db: Arc<DatabaseConnection>,
}

impl ForumPostRepository {
    /// Create a new forum post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post or reply by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<forum_post::Model>> {
        ForumPost::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post or reply by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<forum_post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Find a top-level post by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<forum_post::Model>> {
        ForumPost::find()
            .filter(forum_post::Column::Slug.eq(slug))
            .filter(forum_post::Column::ParentPostId.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a top-level post.
    pub async fn create(&self, model: forum_post::ActiveModel) -> AppResult<forum_post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a reply and bump its parent's reply count and activity time.
    pub async fn create_reply(
        &self,
        parent_id: &str,
        model: forum_post::ActiveModel,
    ) -> AppResult<forum_post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let reply = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        ForumPost::update_many()
            .col_expr(
                forum_post::Column::ReplyCount,
                Expr::col(forum_post::Column::ReplyCount).add(1),
            )
            .col_expr(forum_post::Column::LastActivityAt, Expr::value(Utc::now()))
            .filter(forum_post::Column::Id.eq(parent_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(reply)
    }

    /// Update a post.
    pub async fn update(&self, model: forum_post::ActiveModel) -> AppResult<forum_post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post or reply.
    ///
    /// Replies and votes of a deleted post go with it through the foreign
    /// key cascades. Deleting a reply decrements its parent's reply count.
    pub async fn delete(&self, post: &forum_post::Model) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        ForumPost::delete_by_id(post.id.clone())
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(parent_id) = &post.parent_post_id {
            ForumPost::update_many()
                .col_expr(
                    forum_post::Column::ReplyCount,
                    Expr::cust("GREATEST(reply_count - 1, 0)"),
                )
                .filter(forum_post::Column::Id.eq(parent_id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Increment the view count atomically.
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        ForumPost::update_many()
            .col_expr(
                forum_post::Column::ViewCount,
                Expr::col(forum_post::Column::ViewCount).add(1),
            )
            .filter(forum_post::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// List top-level posts for the forum index.
    pub async fn list_top_level(&self, params: &PostListQuery) -> AppResult<Vec<forum_post::Model>> {
        Self::list_query(params)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn list_query(params: &PostListQuery) -> Select<ForumPost> {
        let mut query = ForumPost::find().filter(forum_post::Column::ParentPostId.is_null());

        if let Some(category) = params.category {
            query = query.filter(forum_post::Column::Category.eq(category));
        }

        if let Some(term) = params.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            query = query.filter(
                Condition::any()
                    .add(Expr::col(forum_post::Column::Title).ilike(pattern.clone()))
                    .add(Expr::col(forum_post::Column::Content).ilike(pattern)),
            );
        }

        query = match params.sort {
            PostSort::Latest => query.order_by_desc(forum_post::Column::LastActivityAt),
            PostSort::Popular => query.order_by_desc(forum_post::Column::Upvotes),
            PostSort::New => query.order_by_desc(forum_post::Column::CreatedAt),
        };

        query
            .order_by_desc(forum_post::Column::Id)
            .limit(params.limit.unwrap_or(DEFAULT_PAGE_SIZE))
            .offset(params.offset)
    }

    /// Replies of a post, oldest first.
    pub async fn find_replies(&self, parent_id: &str) -> AppResult<Vec<forum_post::Model>> {
        ForumPost::find()
            .filter(forum_post::Column::ParentPostId.eq(parent_id))
            .order_by_asc(forum_post::Column::CreatedAt)
            .order_by_asc(forum_post::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's most recent top-level posts.
    pub async fn find_recent_by_user(
        &self,
        user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<forum_post::Model>> {
        ForumPost::find()
            .filter(forum_post::Column::UserId.eq(user_id))
            .filter(forum_post::Column::ParentPostId.is_null())
            .order_by_desc(forum_post::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Everything a user has written, posts and replies, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<forum_post::Model>> {
        ForumPost::find()
            .filter(forum_post::Column::UserId.eq(user_id))
            .order_by_desc(forum_post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's top-level posts.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        ForumPost::find()
            .filter(forum_post::Column::UserId.eq(user_id))
            .filter(forum_post::Column::ParentPostId.is_null())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
