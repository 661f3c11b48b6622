//! Forum vote entity (one row per voter per post).

use ratenextdoor_common::VoteDirection;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    #[sea_orm(string_value = "up")]
    Up,
    #[sea_orm(string_value = "down")]
    Down,
}

impl From<VoteDirection> for VoteType {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => Self::Up,
            VoteDirection::Down => Self::Down,
        }
    }
}

impl From<VoteType> for VoteDirection {
    fn from(vote_type: VoteType) -> Self {
        match vote_type {
            VoteType::Up => Self::Up,
            VoteType::Down => Self::Down,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "forum_vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The voter
    pub user_id: String,

    pub post_id: String,

    pub vote_type: VoteType,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Voter,

    #[sea_orm(
        belongs_to = "super::forum_post::Entity",
        from = "Column::PostId",
        to = "super::forum_post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Voter.def()
    }
}

impl Related<super::forum_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
