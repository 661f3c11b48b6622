//! Create forum vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ForumVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForumVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ForumVote::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(ForumVote::PostId).string_len(32).not_null())
                    .col(ColumnDef::new(ForumVote::VoteType).string_len(8).not_null())
                    .col(
                        ColumnDef::new(ForumVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_vote_user")
                            .from(ForumVote::Table, ForumVote::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_vote_post")
                            .from(ForumVote::Table, ForumVote::PostId)
                            .to(ForumPost::Table, ForumPost::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, post_id) - one vote per user per post
        manager
            .create_index(
                Index::create()
                    .name("idx_forum_vote_user_post")
                    .table(ForumVote::Table)
                    .col(ForumVote::UserId)
                    .col(ForumVote::PostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: post_id (cascade deletes, counter audits)
        manager
            .create_index(
                Index::create()
                    .name("idx_forum_vote_post_id")
                    .table(ForumVote::Table)
                    .col(ForumVote::PostId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ForumVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ForumVote {
    Table,
    Id,
    UserId,
    PostId,
    VoteType,
    CreatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}

#[derive(Iden)]
enum ForumPost {
    Table,
    Id,
}
