//! Profile entity (one row per authenticated user).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ProfileRole {
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
    /// Member whose submissions have been verified.
    #[sea_orm(string_value = "verified")]
    Verified,
    /// Moderator with delete rights over any forum post.
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    /// The identity provider's user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    /// Unique public handle, set during onboarding
    #[sea_orm(unique, nullable)]
    pub username: Option<String>,

    #[sea_orm(nullable)]
    pub display_name: Option<String>,

    #[sea_orm(nullable)]
    pub full_name: Option<String>,

    #[sea_orm(nullable)]
    pub date_of_birth: Option<Date>,

    /// Ten US digits, no formatting
    #[sea_orm(nullable)]
    pub phone: Option<String>,

    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Hide the username behind "Anonymous" in the forum
    pub is_anonymous: bool,

    pub role: ProfileRole,

    pub onboarding_completed: bool,

    pub email_verified: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::forum_post::Entity")]
    ForumPosts,

    #[sea_orm(has_many = "super::forum_vote::Entity")]
    ForumVotes,

    #[sea_orm(has_many = "super::rate_submission::Entity")]
    RateSubmissions,
}

impl Related<super::forum_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ForumPosts.def()
    }
}

impl Related<super::forum_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ForumVotes.def()
    }
}

impl Related<super::rate_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RateSubmissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Name shown next to this user's forum content.
    #[must_use]
    pub fn public_name(&self) -> String {
        if self.is_anonymous {
            return "Anonymous".to_string();
        }
        self.username
            .clone()
            .or_else(|| self.display_name.clone())
            .unwrap_or_else(|| "Member".to_string())
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, ProfileRole::Admin)
    }
}
