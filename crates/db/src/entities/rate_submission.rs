//! Rate submission entity (one home's insurance premium).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of home a premium applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum HomeType {
    #[sea_orm(string_value = "single_family")]
    SingleFamily,
    #[sea_orm(string_value = "townhouse")]
    Townhouse,
    #[sea_orm(string_value = "condo")]
    Condo,
    #[sea_orm(string_value = "multi_family")]
    MultiFamily,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rate_submission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The submitting user
    pub user_id: String,

    pub full_address: String,

    pub street_address: String,

    pub city: String,

    /// Two-letter state code
    pub state: String,

    pub zip_code: String,

    /// Precise coordinates, never exposed publicly
    pub latitude: f64,

    pub longitude: f64,

    pub num_bedrooms: i32,

    pub num_bathrooms: f64,

    pub square_footage: i32,

    pub year_built: i32,

    pub home_type: HomeType,

    pub monthly_premium: f64,

    pub annual_premium: f64,

    pub coverage_amount: f64,

    pub deductible: f64,

    pub insurance_provider: String,

    pub visible_to_public: bool,

    pub is_verified: bool,

    pub created_at: DateTimeWithTimeZone,

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
    Submitter,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submitter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
