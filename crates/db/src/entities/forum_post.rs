//! Forum post entity.
//!
//! Top-level posts and replies share this table. A reply has a
//! `parent_post_id`, an empty title, and no slug or category.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Forum category of a top-level post.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ForumCategory {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "rates")]
    Rates,
    #[sea_orm(string_value = "claims")]
    Claims,
    #[sea_orm(string_value = "brokers")]
    Brokers,
    #[sea_orm(string_value = "tips")]
    Tips,
    #[sea_orm(string_value = "news")]
    News,
    #[sea_orm(string_value = "questions")]
    Questions,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "forum_post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author's profile ID
    pub user_id: String,

    /// Set for replies only
    #[sea_orm(nullable)]
    pub parent_post_id: Option<String>,

    /// Empty for replies
    pub title: String,

    #[sea_orm(unique, nullable)]
    pub slug: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    #[sea_orm(nullable)]
    pub category: Option<ForumCategory>,

    /// Public URLs of attached images, in display order
    #[sea_orm(column_type = "JsonBinary")]
    pub image_urls: Json,

    pub upvotes: i32,

    pub downvotes: i32,

    pub view_count: i32,

    pub reply_count: i32,

    pub is_pinned: bool,

    pub is_locked: bool,

    pub is_edited: bool,

    #[sea_orm(nullable)]
    pub edited_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    /// Bumped when the post is created and whenever it gets a reply
    pub last_activity_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentPostId",
        to = "Column::Id",
        on_delete = "Cascade"
    )]
    Parent,

    #[sea_orm(has_many = "super::forum_vote::Entity")]
    Votes,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::forum_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[must_use]
    pub const fn is_reply(&self) -> bool {
        self.parent_post_id.is_some()
    }

    #[must_use]
    pub const fn score(&self) -> i32 {
        self.upvotes - self.downvotes
    }

    /// Image URLs as strings, skipping anything malformed.
    #[must_use]
    pub fn image_url_list(&self) -> Vec<String> {
        self.image_urls
            .as_array()
            .map(|urls| {
                urls.iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
