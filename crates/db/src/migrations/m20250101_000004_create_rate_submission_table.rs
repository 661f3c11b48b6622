//! Create rate submission table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RateSubmission::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RateSubmission::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::UserId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::FullAddress)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::StreetAddress)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RateSubmission::City).string_len(128).not_null())
                    .col(ColumnDef::new(RateSubmission::State).string_len(2).not_null())
                    .col(ColumnDef::new(RateSubmission::ZipCode).string_len(5).not_null())
                    .col(ColumnDef::new(RateSubmission::Latitude).double().not_null())
                    .col(ColumnDef::new(RateSubmission::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(RateSubmission::NumBedrooms)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::NumBathrooms)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::SquareFootage)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RateSubmission::YearBuilt).integer().not_null())
                    .col(
                        ColumnDef::new(RateSubmission::HomeType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::MonthlyPremium)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::AnnualPremium)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::CoverageAmount)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RateSubmission::Deductible).double().not_null())
                    .col(
                        ColumnDef::new(RateSubmission::InsuranceProvider)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::VisibleToPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RateSubmission::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(RateSubmission::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rate_submission_user")
                            .from(RateSubmission::Table, RateSubmission::UserId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (dashboard)
        manager
            .create_index(
                Index::create()
                    .name("idx_rate_submission_user_id")
                    .table(RateSubmission::Table)
                    .col(RateSubmission::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: visible_to_public (map)
        manager
            .create_index(
                Index::create()
                    .name("idx_rate_submission_visible")
                    .table(RateSubmission::Table)
                    .col(RateSubmission::VisibleToPublic)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RateSubmission::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RateSubmission {
    Table,
    Id,
    UserId,
    FullAddress,
    StreetAddress,
    City,
    State,
    ZipCode,
    Latitude,
    Longitude,
    NumBedrooms,
    NumBathrooms,
    SquareFootage,
    YearBuilt,
    HomeType,
    MonthlyPremium,
    AnnualPremium,
    CoverageAmount,
    Deductible,
    InsuranceProvider,
    VisibleToPublic,
    IsVerified,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}
