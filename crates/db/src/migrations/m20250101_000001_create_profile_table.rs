//! Create profile table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profile::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profile::Email).string_len(320))
                    .col(ColumnDef::new(Profile::Username).string_len(20).unique_key())
                    .col(ColumnDef::new(Profile::DisplayName).string_len(128))
                    .col(ColumnDef::new(Profile::FullName).string_len(256))
                    .col(ColumnDef::new(Profile::DateOfBirth).date())
                    .col(ColumnDef::new(Profile::Phone).string_len(10))
                    .col(ColumnDef::new(Profile::AvatarUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Profile::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profile::Role)
                            .string_len(16)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        ColumnDef::new(Profile::OnboardingCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profile::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Profile::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
    Email,
    Username,
    DisplayName,
    FullName,
    DateOfBirth,
    Phone,
    AvatarUrl,
    IsAnonymous,
    Role,
    OnboardingCompleted,
    EmailVerified,
    CreatedAt,
    UpdatedAt,
}
