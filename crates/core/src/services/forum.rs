//! Forum service.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use ratenextdoor_common::{AppError, AppResult, IdGenerator, VoteDirection, VoteState};
use ratenextdoor_db::{
    entities::{
        forum_post::{self, ForumCategory},
        profile,
    },
    repositories::{ForumPostRepository, ForumVoteRepository, PostListQuery, ProfileRepository},
};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::Actor;
use crate::validation;

/// Display metadata of a forum category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryInfo {
    pub id: ForumCategory,
    pub name: &'static str,
    pub description: &'static str,
}

/// All categories, in display order.
pub const CATEGORIES: [CategoryInfo; 7] = [
    CategoryInfo {
        id: ForumCategory::General,
        name: "General Discussion",
        description: "Open discussions about insurance",
    },
    CategoryInfo {
        id: ForumCategory::Rates,
        name: "Rate Discussions",
        description: "Compare and discuss premium rates",
    },
    CategoryInfo {
        id: ForumCategory::Claims,
        name: "Claims Help",
        description: "Get help with filing and managing claims",
    },
    CategoryInfo {
        id: ForumCategory::Brokers,
        name: "Broker Reviews",
        description: "Share experiences with insurance brokers",
    },
    CategoryInfo {
        id: ForumCategory::Tips,
        name: "Money Saving Tips",
        description: "Strategies to lower your premiums",
    },
    CategoryInfo {
        id: ForumCategory::News,
        name: "Insurance News",
        description: "Latest industry updates and changes",
    },
    CategoryInfo {
        id: ForumCategory::Questions,
        name: "Q&A",
        description: "Ask and answer insurance questions",
    },
];

/// Input for creating a top-level post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    pub category: Option<ForumCategory>,

    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Input for replying to a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplyInput {
    #[validate(length(max = 20000, message = "Reply is too long"))]
    pub content: String,

    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Input for editing a post or reply.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostInput {
    #[validate(length(max = 20000, message = "Content is too long"))]
    pub content: String,
}

/// A newly created post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    pub id: String,
    pub slug: String,
}

/// Result of deleting a post or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPost {
    pub id: String,
    /// A deleted reply leaves the client on the parent's page.
    pub was_reply: bool,
    pub parent_post_id: Option<String>,
}

/// Public identity of an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub name: String,
    pub avatar_url: Option<String>,
    pub is_anonymous: bool,
}

impl AuthorView {
    fn of(profile: Option<&profile::Model>) -> Self {
        match profile {
            Some(p) => Self {
                name: p.public_name(),
                avatar_url: if p.is_anonymous {
                    None
                } else {
                    p.avatar_url.clone()
                },
                is_anonymous: p.is_anonymous,
            },
            None => Self {
                name: "Deleted user".to_string(),
                avatar_url: None,
                is_anonymous: false,
            },
        }
    }
}

/// A post or reply as rendered for a viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub user_id: String,
    pub parent_post_id: Option<String>,
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub category: Option<ForumCategory>,
    pub image_urls: Vec<String>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
    pub view_count: i32,
    pub reply_count: i32,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub last_activity_at: DateTime<FixedOffset>,
    pub author: AuthorView,
    /// The viewer's current vote; `none` for anonymous viewers.
    pub viewer_vote: VoteState,
}

impl PostView {
    fn build(post: forum_post::Model, author: Option<&profile::Model>, viewer_vote: VoteState) -> Self {
        let image_urls = post.image_url_list();
        let score = post.score();
        Self {
            id: post.id,
            user_id: post.user_id,
            parent_post_id: post.parent_post_id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            category: post.category,
            image_urls,
            upvotes: post.upvotes,
            downvotes: post.downvotes,
            score,
            view_count: post.view_count,
            reply_count: post.reply_count,
            is_pinned: post.is_pinned,
            is_locked: post.is_locked,
            is_edited: post.is_edited,
            edited_at: post.edited_at,
            created_at: post.created_at,
            last_activity_at: post.last_activity_at,
            author: AuthorView::of(author),
            viewer_vote,
        }
    }
}

/// A top-level post with its replies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub post: PostView,
    pub replies: Vec<PostView>,
}

/// Everything one member has written, split the way the "my posts" page
/// shows it. Both lists are newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPosts {
    pub posts: Vec<PostView>,
    pub replies: Vec<PostView>,
}

/// Forum service for business logic.
#[derive(Clone)]
pub struct ForumService {
    post_repo: ForumPostRepository,
    profile_repo: ProfileRepository,
    vote_repo: ForumVoteRepository,
    id_gen: IdGenerator,
}

impl ForumService {
    /// Create a new forum service.
    #[must_use]
    pub const fn new(
        post_repo: ForumPostRepository,
        profile_repo: ProfileRepository,
        vote_repo: ForumVoteRepository,
    ) -> Self {
        Self {
            post_repo,
            profile_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Category metadata for the forum index.
    #[must_use]
    pub const fn categories(&self) -> &'static [CategoryInfo] {
        &CATEGORIES
    }

    /// List top-level posts.
    pub async fn list_posts(
        &self,
        query: &PostListQuery,
        viewer: Option<&Actor>,
    ) -> AppResult<Vec<PostView>> {
        let posts = self.post_repo.list_top_level(query).await?;
        self.render(posts, viewer).await
    }

    /// Create a top-level post.
    pub async fn create_post(&self, actor: &Actor, input: CreatePostInput) -> AppResult<CreatedPost> {
        input.validate()?;

        let title = input.title.trim();
        let Some(category) = input.category else {
            return Err(AppError::Validation(
                "Title, content, and category are required".to_string(),
            ));
        };
        if title.is_empty() || input.content.trim().is_empty() {
            return Err(AppError::Validation(
                "Title, content, and category are required".to_string(),
            ));
        }

        validation::validate_post_title(title)?;
        validation::validate_post_body(&input.content)?;
        validation::validate_image_count(input.image_urls.len())?;

        let id = self.id_gen.generate();
        let slug = validation::slugify(title, IdGenerator::slug_suffix(&id));
        let now = Utc::now();

        let model = forum_post::ActiveModel {
            id: Set(id),
            user_id: Set(actor.user_id.clone()),
            parent_post_id: Set(None),
            title: Set(title.to_string()),
            slug: Set(Some(slug)),
            content: Set(input.content),
            category: Set(Some(category)),
            image_urls: Set(serde_json::json!(input.image_urls)),
            upvotes: Set(0),
            downvotes: Set(0),
            view_count: Set(0),
            reply_count: Set(0),
            is_pinned: Set(false),
            is_locked: Set(false),
            is_edited: Set(false),
            edited_at: Set(None),
            created_at: Set(now.into()),
            last_activity_at: Set(now.into()),
            updated_at: Set(None),
        };

        let post = self.post_repo.create(model).await?;
        let slug = post
            .slug
            .ok_or_else(|| AppError::Internal(format!("post {} stored without slug", post.id)))?;

        tracing::info!(post_id = %post.id, user_id = %actor.user_id, "Post created");

        Ok(CreatedPost { id: post.id, slug })
    }

    /// Reply to a top-level post.
    pub async fn create_reply(
        &self,
        actor: &Actor,
        parent_id: &str,
        input: CreateReplyInput,
    ) -> AppResult<PostView> {
        input.validate()?;
        validation::validate_reply_body(&input.content)?;
        validation::validate_image_count(input.image_urls.len())?;

        let parent = self.post_repo.get_by_id(parent_id).await?;
        if parent.is_reply() {
            return Err(AppError::BadRequest(
                "Replies can only be made to top-level posts".to_string(),
            ));
        }
        if parent.is_locked {
            return Err(AppError::Forbidden("This post is locked".to_string()));
        }

        let now = Utc::now();
        let model = forum_post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor.user_id.clone()),
            parent_post_id: Set(Some(parent.id.clone())),
            title: Set(String::new()),
            slug: Set(None),
            content: Set(input.content),
            category: Set(None),
            image_urls: Set(serde_json::json!(input.image_urls)),
            upvotes: Set(0),
            downvotes: Set(0),
            view_count: Set(0),
            reply_count: Set(0),
            is_pinned: Set(false),
            is_locked: Set(false),
            is_edited: Set(false),
            edited_at: Set(None),
            created_at: Set(now.into()),
            last_activity_at: Set(now.into()),
            updated_at: Set(None),
        };

        let reply = self.post_repo.create_reply(&parent.id, model).await?;
        let author = self.profile_repo.find_by_id(&actor.user_id).await?;

        tracing::info!(reply_id = %reply.id, parent_id = %parent.id, "Reply created");

        Ok(PostView::build(reply, author.as_ref(), VoteState::None))
    }

    /// Edit a post or reply's content. Owner only.
    pub async fn update_post(
        &self,
        actor: &Actor,
        post_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<PostView> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        actor.require_owner(&post.user_id, "posts")?;

        if post.is_reply() {
            validation::validate_reply_body(&input.content)?;
        } else {
            validation::validate_post_body(&input.content)?;
        }

        let now = Utc::now();
        let mut active = post.into_active_model();
        active.content = Set(input.content);
        active.is_edited = Set(true);
        active.edited_at = Set(Some(now.into()));
        active.updated_at = Set(Some(now.into()));

        let updated = self.post_repo.update(active).await?;
        let vote = self.viewer_vote(actor, &updated.id).await?;
        let author = self.profile_repo.find_by_id(&updated.user_id).await?;

        Ok(PostView::build(updated, author.as_ref(), vote))
    }

    /// Delete a post or reply. Owner or admin.
    pub async fn delete_post(&self, actor: &Actor, post_id: &str) -> AppResult<DeletedPost> {
        let post = self.post_repo.get_by_id(post_id).await?;
        actor.require_owner_or_admin(&post.user_id, "posts")?;

        self.post_repo.delete(&post).await?;

        tracing::info!(
            post_id = %post.id,
            by = %actor.user_id,
            admin = actor.is_admin() && !actor.owns(&post.user_id),
            "Post deleted"
        );

        Ok(DeletedPost {
            was_reply: post.is_reply(),
            id: post.id,
            parent_post_id: post.parent_post_id,
        })
    }

    /// Load a post page by slug and count the view.
    pub async fn post_detail(&self, slug: &str, viewer: Option<&Actor>) -> AppResult<PostDetail> {
        let mut post = self
            .post_repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::PostNotFound(slug.to_string()))?;

        self.post_repo.increment_view_count(&post.id).await?;
        post.view_count += 1;

        let replies = self.post_repo.find_replies(&post.id).await?;

        let mut rendered = self
            .render(std::iter::once(post).chain(replies).collect(), viewer)
            .await?
            .into_iter();
        let post = rendered
            .next()
            .ok_or_else(|| AppError::Internal("post vanished while rendering".to_string()))?;

        Ok(PostDetail {
            post,
            replies: rendered.collect(),
        })
    }

    /// The actor's own posts and replies.
    pub async fn user_posts(&self, actor: &Actor) -> AppResult<UserPosts> {
        let all = self.post_repo.find_by_user(&actor.user_id).await?;
        let rendered = self.render(all, Some(actor)).await?;
        let (replies, posts) = rendered
            .into_iter()
            .partition(|p| p.parent_post_id.is_some());
        Ok(UserPosts { posts, replies })
    }

    /// Count a view without loading the page.
    pub async fn increment_view_count(&self, post_id: &str) -> AppResult<()> {
        self.post_repo.increment_view_count(post_id).await
    }

    async fn viewer_vote(&self, actor: &Actor, post_id: &str) -> AppResult<VoteState> {
        let vote = self
            .vote_repo
            .find_by_user_and_post(&actor.user_id, post_id)
            .await?;
        Ok(VoteState::from(vote.map(|v| VoteDirection::from(v.vote_type))))
    }

    /// Attach authors and the viewer's votes, preserving order.
    async fn render(
        &self,
        posts: Vec<forum_post::Model>,
        viewer: Option<&Actor>,
    ) -> AppResult<Vec<PostView>> {
        let mut author_ids: Vec<String> = posts.iter().map(|p| p.user_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<String, profile::Model> = self
            .profile_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let votes: HashMap<String, VoteState> = match viewer {
            Some(actor) => {
                let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
                self.vote_repo
                    .find_by_user_and_posts(&actor.user_id, &post_ids)
                    .await?
                    .into_iter()
                    .map(|v| (v.post_id, VoteDirection::from(v.vote_type).into()))
                    .collect()
            }
            None => HashMap::new(),
        };

        Ok(posts
            .into_iter()
            .map(|post| {
                let vote = votes.get(&post.id).copied().unwrap_or_default();
                let author = authors.get(&post.user_id);
                PostView::build(post, author, vote)
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ratenextdoor_db::entities::{
        forum_vote::{self, VoteType},
        profile::ProfileRole,
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn test_post(id: &str, user_id: &str, parent: Option<&str>) -> forum_post::Model {
        let now = Utc::now();
        forum_post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            parent_post_id: parent.map(ToString::to_string),
            title: if parent.is_some() {
                String::new()
            } else {
                "Premium went up again".to_string()
            },
            slug: parent.is_none().then(|| format!("premium-went-up-again-{id}")),
            content: "My renewal came in 30% higher this year.".to_string(),
            category: parent.is_none().then_some(ForumCategory::Rates),
            image_urls: serde_json::json!([]),
            upvotes: 0,
            downvotes: 0,
            view_count: 4,
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

    fn test_profile(id: &str, username: &str, anonymous: bool) -> profile::Model {
        profile::Model {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            username: Some(username.to_string()),
            display_name: Some("Pat".to_string()),
            full_name: Some("Pat Doe".to_string()),
            date_of_birth: None,
            phone: None,
            avatar_url: Some("https://cdn.example.com/a.png".to_string()),
            is_anonymous: anonymous,
            role: ProfileRole::Member,
            onboarding_completed: true,
            email_verified: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> ForumService {
        let db = Arc::new(db);
        ForumService::new(
            ForumPostRepository::new(db.clone()),
            ProfileRepository::new(db.clone()),
            ForumVoteRepository::new(db),
        )
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    #[tokio::test]
    async fn test_user_posts_splits_posts_from_replies() {
        let own_vote = forum_vote::Model {
            id: "v1".to_string(),
            post_id: "p1".to_string(),
            user_id: "u1".to_string(),
            vote_type: VoteType::Up,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                test_post("r2", "u1", Some("p7")),
                test_post("p1", "u1", None),
                test_post("r1", "u1", Some("p3")),
            ]])
            .append_query_results([[test_profile("u1", "pat_doe", false)]])
            .append_query_results([[own_vote]])
            .into_connection();
        let svc = service(db);

        let mine = svc
            .user_posts(&Actor::new("u1", ProfileRole::Member))
            .await
            .unwrap();

        assert_eq!(mine.posts.len(), 1);
        assert_eq!(mine.posts[0].id, "p1");
        assert_eq!(mine.posts[0].viewer_vote, VoteState::Up);
        let reply_ids: Vec<&str> = mine.replies.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(reply_ids, ["r2", "r1"]);
        assert_eq!(mine.replies[0].author.name, "pat_doe");
    }

    #[test]
    fn test_categories_cover_every_variant() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let ids: Vec<ForumCategory> = svc.categories().iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 7);
        assert_eq!(ids[0], ForumCategory::General);
        assert!(svc.categories().iter().all(|c| !c.name.is_empty()));
    }

    #[tokio::test]
    async fn test_create_post_rejects_short_title_before_storage() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let actor = Actor::new("u1", ProfileRole::Member);

        let result = svc
            .create_post(
                &actor,
                CreatePostInput {
                    title: "abcd".to_string(),
                    content: "long enough body".to_string(),
                    category: Some(ForumCategory::General),
                    image_urls: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_post_requires_category() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let actor = Actor::new("u1", ProfileRole::Member);

        let result = svc
            .create_post(
                &actor,
                CreatePostInput {
                    title: "Hello".to_string(),
                    content: "1234567890".to_string(),
                    category: None,
                    image_urls: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_post_returns_slug() {
        let mut stored = test_post("01jabcdefghijkmnpqrstvwxyz", "u1", None);
        stored.title = "Hello".to_string();
        stored.slug = Some("hello-vwxyz0".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored]])
            .into_connection();
        let svc = service(db);
        let actor = Actor::new("u1", ProfileRole::Member);

        let created = svc
            .create_post(
                &actor,
                CreatePostInput {
                    title: "Hello".to_string(),
                    content: "1234567890".to_string(),
                    category: Some(ForumCategory::General),
                    image_urls: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(created.id, "01jabcdefghijkmnpqrstvwxyz");
        assert!(!created.slug.is_empty());
    }

    #[tokio::test]
    async fn test_reply_to_reply_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_post("r1", "u2", Some("p1"))]])
            .into_connection();
        let svc = service(db);
        let actor = Actor::new("u1", ProfileRole::Member);

        let result = svc
            .create_reply(
                &actor,
                "r1",
                CreateReplyInput {
                    content: "me too".to_string(),
                    image_urls: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_reply_to_locked_post_is_forbidden() {
        let mut parent = test_post("p1", "u2", None);
        parent.is_locked = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[parent]])
            .into_connection();
        let svc = service(db);
        let actor = Actor::new("u1", ProfileRole::Member);

        let result = svc
            .create_reply(
                &actor,
                "p1",
                CreateReplyInput {
                    content: "me too".to_string(),
                    image_urls: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_post_requires_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_post("p1", "owner", None)]])
            .into_connection();
        let svc = service(db);
        let actor = Actor::new("intruder", ProfileRole::Admin);

        let result = svc
            .update_post(
                &actor,
                "p1",
                UpdatePostInput {
                    content: "rewritten by someone else".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_deletes_reply_and_reports_parent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_post("r1", "u2", Some("p1"))]])
            .append_exec_results([exec_ok(), exec_ok()])
            .into_connection();
        let svc = service(db);
        let admin = Actor::new("admin", ProfileRole::Admin);

        let deleted = svc.delete_post(&admin, "r1").await.unwrap();

        assert!(deleted.was_reply);
        assert_eq!(deleted.parent_post_id.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_member_cannot_delete_others_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_post("p1", "u2", None)]])
            .into_connection();
        let svc = service(db);
        let member = Actor::new("u1", ProfileRole::Member);

        let result = svc.delete_post(&member, "p1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_post_detail_marks_viewer_votes_and_hides_anonymous_authors() {
        let vote = forum_vote::Model {
            id: "v1".to_string(),
            user_id: "viewer".to_string(),
            post_id: "r1".to_string(),
            vote_type: VoteType::Down,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_post("p1", "u1", None)]])
            .append_exec_results([exec_ok()])
            .append_query_results([[test_post("r1", "u2", Some("p1"))]])
            .append_query_results([[
                test_profile("u1", "quickfox", false),
                test_profile("u2", "shyowl", true),
            ]])
            .append_query_results([[vote]])
            .into_connection();
        let svc = service(db);
        let viewer = Actor::new("viewer", ProfileRole::Member);

        let detail = svc
            .post_detail("premium-went-up-again-p1", Some(&viewer))
            .await
            .unwrap();

        assert_eq!(detail.post.view_count, 5);
        assert_eq!(detail.post.author.name, "quickfox");
        assert_eq!(detail.post.viewer_vote, VoteState::None);

        assert_eq!(detail.replies.len(), 1);
        assert_eq!(detail.replies[0].author.name, "Anonymous");
        assert!(detail.replies[0].author.avatar_url.is_none());
        assert_eq!(detail.replies[0].viewer_vote, VoteState::Down);
    }

    #[tokio::test]
    async fn test_post_detail_missing_slug() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<forum_post::Model>::new()])
            .into_connection();
        let svc = service(db);

        let result = svc.post_detail("nope", None).await;
        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
