//! Create forum post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ForumPost::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForumPost::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ForumPost::UserId).string_len(64).not_null())
                    .col(ColumnDef::new(ForumPost::ParentPostId).string_len(32))
                    .col(
                        ColumnDef::new(ForumPost::Title)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ForumPost::Slug).string_len(128).unique_key())
                    .col(ColumnDef::new(ForumPost::Content).text().not_null())
                    .col(ColumnDef::new(ForumPost::Category).string_len(16))
                    .col(
                        ColumnDef::new(ForumPost::ImageUrls)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(ForumPost::Upvotes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ForumPost::Downvotes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ForumPost::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ForumPost::ReplyCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ForumPost::IsPinned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ForumPost::IsLocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ForumPost::IsEdited)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ForumPost::EditedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(ForumPost::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ForumPost::LastActivityAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ForumPost::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_post_user")
                            .from(ForumPost::Table, ForumPost::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_forum_post_parent")
                            .from(ForumPost::Table, ForumPost::ParentPostId)
                            .to(ForumPost::Table, ForumPost::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Counters never go negative
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE forum_post ADD CONSTRAINT chk_forum_post_counters \
                 CHECK (upvotes >= 0 AND downvotes >= 0 AND view_count >= 0 AND reply_count >= 0)",
            )
            .await?;

        // Index: parent_post_id (replies of a post)
        manager
            .create_index(
                Index::create()
                    .name("idx_forum_post_parent_post_id")
                    .table(ForumPost::Table)
                    .col(ForumPost::ParentPostId)
                    .to_owned(),
            )
            .await?;

        // Index: user_id (dashboard "my posts")
        manager
            .create_index(
                Index::create()
                    .name("idx_forum_post_user_id")
                    .table(ForumPost::Table)
                    .col(ForumPost::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: (category, last_activity_at) for the forum index
        manager
            .create_index(
                Index::create()
                    .name("idx_forum_post_category_activity")
                    .table(ForumPost::Table)
                    .col(ForumPost::Category)
                    .col(ForumPost::LastActivityAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ForumPost::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ForumPost {
    Table,
    Id,
    UserId,
    ParentPostId,
    Title,
    Slug,
    Content,
    Category,
    ImageUrls,
    Upvotes,
    Downvotes,
    ViewCount,
    ReplyCount,
    IsPinned,
    IsLocked,
    IsEdited,
    EditedAt,
    CreatedAt,
    LastActivityAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}
