//! Signed-in user's dashboard.

use futures::try_join;
use ratenextdoor_common::AppResult;
use ratenextdoor_db::repositories::{
    ForumPostRepository, ProfileRepository, RateSubmissionRepository,
};
use serde::Serialize;

use crate::Actor;
use crate::services::profile::ProfileResponse;
use crate::services::rate::RateView;

/// Recent posts shown on the dashboard.
pub const RECENT_POSTS_LIMIT: u64 = 5;

/// Compact post entry linking to the post page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPost {
    pub id: String,
    pub title: String,
    pub slug: Option<String>,
    pub reply_count: i32,
    pub score: i32,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub rate_count: usize,
    pub public_rate_count: usize,
    pub post_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub profile: ProfileResponse,
    pub rates: Vec<RateView>,
    pub recent_posts: Vec<RecentPost>,
    pub stats: DashboardStats,
}

/// Dashboard service.
#[derive(Clone)]
pub struct DashboardService {
    profile_repo: ProfileRepository,
    rate_repo: RateSubmissionRepository,
    post_repo: ForumPostRepository,
}

impl DashboardService {
    #[must_use]
    pub const fn new(
        profile_repo: ProfileRepository,
        rate_repo: RateSubmissionRepository,
        post_repo: ForumPostRepository,
    ) -> Self {
        Self {
            profile_repo,
            rate_repo,
            post_repo,
        }
    }

    /// Assemble the dashboard for the actor.
    pub async fn load(&self, actor: &Actor) -> AppResult<Dashboard> {
        let (profile, rates, posts, post_count) = try_join!(
            self.profile_repo.get_by_id(&actor.user_id),
            self.rate_repo.find_by_user(&actor.user_id),
            self.post_repo
                .find_recent_by_user(&actor.user_id, RECENT_POSTS_LIMIT),
            self.post_repo.count_by_user(&actor.user_id),
        )?;

        let stats = DashboardStats {
            rate_count: rates.len(),
            public_rate_count: rates.iter().filter(|r| r.visible_to_public).count(),
            post_count,
        };

        let recent_posts = posts
            .into_iter()
            .map(|p| RecentPost {
                score: p.score(),
                id: p.id,
                title: p.title,
                slug: p.slug,
                reply_count: p.reply_count,
                created_at: p.created_at,
            })
            .collect();

        Ok(Dashboard {
            profile: profile.into(),
            rates: rates.into_iter().map(RateView::from).collect(),
            recent_posts,
            stats,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ratenextdoor_common::AppError;
    use ratenextdoor_db::entities::profile::{self, ProfileRole};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_missing_profile_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<profile::Model>::new()])
                .into_connection(),
        );
        let svc = DashboardService::new(
            ProfileRepository::new(db.clone()),
            RateSubmissionRepository::new(db.clone()),
            ForumPostRepository::new(db),
        );

        let result = svc.load(&Actor::new("ghost", ProfileRole::Member)).await;
        assert!(matches!(result, Err(AppError::ProfileNotFound(_))));
    }

    #[test]
    fn test_recent_post_serializes_camel_case() {
        let post = RecentPost {
            id: "p1".to_string(),
            title: "Hello there".to_string(),
            slug: Some("hello-there-abcdef".to_string()),
            reply_count: 2,
            score: 3,
            created_at: Utc::now().into(),
        };
        let json = serde_json::to_value(post).unwrap();
        assert_eq!(json["replyCount"], 2);
    }
}
