//! Rate submission service.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use ratenextdoor_common::{AppResult, IdGenerator};
use ratenextdoor_db::{
    entities::rate_submission::{self, HomeType},
    repositories::RateSubmissionRepository,
};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::Actor;
use crate::validation;

/// Smallest displacement of a public point along each axis, in meters.
pub const FUZZ_MIN_METERS: f64 = 50.0;

/// Largest displacement of a public point along each axis, in meters.
pub const FUZZ_MAX_METERS: f64 = 250.0;

const METERS_PER_DEGREE: f64 = 111_320.0;

/// Input for submitting a premium.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRateInput {
    #[validate(length(min = 1, max = 500, message = "Address is required"))]
    pub full_address: String,

    #[validate(length(min = 1, max = 255, message = "Street address is required"))]
    pub street_address: String,

    #[validate(length(min = 1, max = 128, message = "City is required"))]
    pub city: String,

    #[validate(custom(function = "validation::validate_state_code"))]
    pub state: String,

    #[validate(custom(function = "validation::validate_zip_code"))]
    pub zip_code: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude is out of range"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude is out of range"))]
    pub longitude: f64,

    #[validate(range(min = 0, max = 50, message = "Bedrooms must be between 0 and 50"))]
    pub bedrooms: i32,

    #[validate(range(min = 0.0, max = 50.0, message = "Bathrooms must be between 0 and 50"))]
    pub bathrooms: f64,

    #[validate(range(min = 1, max = 100_000, message = "Square footage must be between 1 and 100,000"))]
    pub square_feet: i32,

    #[validate(range(min = 1800, message = "Year built must be 1800 or later"))]
    pub year_built: i32,

    pub home_type: HomeType,

    #[validate(range(min = 0.0, message = "Monthly premium cannot be negative"))]
    pub monthly_premium: f64,

    #[validate(range(exclusive_min = 0.0, message = "Annual premium must be greater than 0"))]
    pub annual_premium: f64,

    #[validate(range(min = 0.0, message = "Coverage amount cannot be negative"))]
    pub coverage_amount: f64,

    #[validate(range(min = 0.0, message = "Deductible cannot be negative"))]
    pub deductible: f64,

    #[validate(length(min = 1, max = 128, message = "Insurance provider is required"))]
    pub insurance_provider: String,
}

/// Partial update of a submission. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRateInput {
    #[validate(length(min = 1, max = 500))]
    pub full_address: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub street_address: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub city: Option<String>,

    #[validate(custom(function = "validation::validate_state_code"))]
    pub state: Option<String>,

    #[validate(custom(function = "validation::validate_zip_code"))]
    pub zip_code: Option<String>,

    /// Applied only together with `longitude`.
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude is out of range"))]
    pub latitude: Option<f64>,

    /// Applied only together with `latitude`.
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude is out of range"))]
    pub longitude: Option<f64>,

    #[validate(range(min = 0, max = 50, message = "Bedrooms must be between 0 and 50"))]
    pub bedrooms: Option<i32>,

    #[validate(range(min = 0.0, max = 50.0, message = "Bathrooms must be between 0 and 50"))]
    pub bathrooms: Option<f64>,

    #[validate(range(min = 1, max = 100_000, message = "Square footage must be between 1 and 100,000"))]
    pub square_feet: Option<i32>,

    #[validate(range(min = 1800, message = "Year built must be 1800 or later"))]
    pub year_built: Option<i32>,

    pub home_type: Option<HomeType>,

    #[validate(range(min = 0.0, message = "Monthly premium cannot be negative"))]
    pub monthly_premium: Option<f64>,

    #[validate(range(exclusive_min = 0.0, message = "Annual premium must be greater than 0"))]
    pub annual_premium: Option<f64>,

    #[validate(range(min = 0.0, message = "Coverage amount cannot be negative"))]
    pub coverage_amount: Option<f64>,

    #[validate(range(min = 0.0, message = "Deductible cannot be negative"))]
    pub deductible: Option<f64>,

    #[validate(length(min = 1, max = 128, message = "Insurance provider is required"))]
    pub insurance_provider: Option<String>,

    pub visible_to_public: Option<bool>,
}

/// A submission as seen by its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateView {
    pub id: String,
    pub full_address: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: i32,
    pub year_built: i32,
    pub home_type: HomeType,
    pub monthly_premium: f64,
    pub annual_premium: f64,
    pub coverage_amount: f64,
    pub deductible: f64,
    pub insurance_provider: String,
    pub visible_to_public: bool,
    pub is_verified: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl From<rate_submission::Model> for RateView {
    fn from(m: rate_submission::Model) -> Self {
        Self {
            id: m.id,
            full_address: m.full_address,
            street_address: m.street_address,
            city: m.city,
            state: m.state,
            zip_code: m.zip_code,
            latitude: m.latitude,
            longitude: m.longitude,
            bedrooms: m.num_bedrooms,
            bathrooms: m.num_bathrooms,
            square_feet: m.square_footage,
            year_built: m.year_built,
            home_type: m.home_type,
            monthly_premium: m.monthly_premium,
            annual_premium: m.annual_premium,
            coverage_amount: m.coverage_amount,
            deductible: m.deductible,
            insurance_provider: m.insurance_provider,
            visible_to_public: m.visible_to_public,
            is_verified: m.is_verified,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A submission on the public map: no owner, no street address, and a
/// fuzzed location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRate {
    pub id: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: i32,
    pub year_built: i32,
    pub home_type: HomeType,
    pub monthly_premium: f64,
    pub annual_premium: f64,
    pub coverage_amount: f64,
    pub deductible: f64,
    pub insurance_provider: String,
    pub is_verified: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<rate_submission::Model> for PublicRate {
    fn from(m: rate_submission::Model) -> Self {
        let (latitude, longitude) = fuzz_point(&m.id, m.latitude, m.longitude);
        Self {
            id: m.id,
            city: m.city,
            state: m.state,
            zip_code: m.zip_code,
            latitude,
            longitude,
            bedrooms: m.num_bedrooms,
            bathrooms: m.num_bathrooms,
            square_feet: m.square_footage,
            year_built: m.year_built,
            home_type: m.home_type,
            monthly_premium: m.monthly_premium,
            annual_premium: m.annual_premium,
            coverage_amount: m.coverage_amount,
            deductible: m.deductible,
            insurance_provider: m.insurance_provider,
            is_verified: m.is_verified,
            created_at: m.created_at,
        }
    }
}

/// Displace a point by a per-`id` offset of
/// [`FUZZ_MIN_METERS`]..=[`FUZZ_MAX_METERS`] along each axis.
///
/// The offset comes from a hash of the ID, so the public point for a given
/// submission never changes.
#[must_use]
pub fn fuzz_point(id: &str, latitude: f64, longitude: f64) -> (f64, f64) {
    let digest = Sha256::digest(id.as_bytes());
    let north = offset_meters(digest[0], digest[1], digest[2]);
    let east = offset_meters(digest[3], digest[4], digest[5]);

    let lat = (latitude + north / METERS_PER_DEGREE).clamp(-90.0, 90.0);

    let scale = latitude.to_radians().cos().max(0.01);
    let mut lng = longitude + east / (METERS_PER_DEGREE * scale);
    if lng > 180.0 {
        lng -= 360.0;
    } else if lng < -180.0 {
        lng += 360.0;
    }

    (lat, lng)
}

fn offset_meters(sign: u8, hi: u8, lo: u8) -> f64 {
    let unit = f64::from(u16::from_be_bytes([hi, lo])) / f64::from(u16::MAX);
    let magnitude = FUZZ_MIN_METERS + unit * (FUZZ_MAX_METERS - FUZZ_MIN_METERS);
    if sign & 1 == 0 { magnitude } else { -magnitude }
}

/// Rate service for business logic.
#[derive(Clone)]
pub struct RateService {
    rate_repo: RateSubmissionRepository,
    id_gen: IdGenerator,
}

impl RateService {
    /// Create a new rate service.
    #[must_use]
    pub const fn new(rate_repo: RateSubmissionRepository) -> Self {
        Self {
            rate_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a premium. New submissions are public.
    pub async fn submit(
        &self,
        actor: &Actor,
        input: SubmitRateInput,
        today: NaiveDate,
    ) -> AppResult<RateView> {
        input.validate()?;
        validation::validate_year_built(input.year_built, today)?;

        let model = rate_submission::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(actor.user_id.clone()),
            full_address: Set(input.full_address),
            street_address: Set(input.street_address),
            city: Set(input.city),
            state: Set(input.state),
            zip_code: Set(input.zip_code),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            num_bedrooms: Set(input.bedrooms),
            num_bathrooms: Set(input.bathrooms),
            square_footage: Set(input.square_feet),
            year_built: Set(input.year_built),
            home_type: Set(input.home_type),
            monthly_premium: Set(input.monthly_premium),
            annual_premium: Set(input.annual_premium),
            coverage_amount: Set(input.coverage_amount),
            deductible: Set(input.deductible),
            insurance_provider: Set(input.insurance_provider),
            visible_to_public: Set(true),
            is_verified: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.rate_repo.create(model).await?;
        tracing::info!(rate_id = %created.id, user_id = %actor.user_id, "Rate submitted");
        Ok(created.into())
    }

    /// Update fields of the actor's own submission.
    pub async fn update(
        &self,
        actor: &Actor,
        rate_id: &str,
        input: UpdateRateInput,
        today: NaiveDate,
    ) -> AppResult<RateView> {
        input.validate()?;
        if let Some(year) = input.year_built {
            validation::validate_year_built(year, today)?;
        }

        let existing = self.rate_repo.get_by_id(rate_id).await?;
        actor.require_owner(&existing.user_id, "rates")?;

        let mut active = existing.into_active_model();
        if let Some(v) = input.full_address {
            active.full_address = Set(v);
        }
        if let Some(v) = input.street_address {
            active.street_address = Set(v);
        }
        if let Some(v) = input.city {
            active.city = Set(v);
        }
        if let Some(v) = input.state {
            active.state = Set(v);
        }
        if let Some(v) = input.zip_code {
            active.zip_code = Set(v);
        }
        if let (Some(lat), Some(lng)) = (input.latitude, input.longitude) {
            active.latitude = Set(lat);
            active.longitude = Set(lng);
        }
        if let Some(v) = input.bedrooms {
            active.num_bedrooms = Set(v);
        }
        if let Some(v) = input.bathrooms {
            active.num_bathrooms = Set(v);
        }
        if let Some(v) = input.square_feet {
            active.square_footage = Set(v);
        }
        if let Some(v) = input.year_built {
            active.year_built = Set(v);
        }
        if let Some(v) = input.home_type {
            active.home_type = Set(v);
        }
        if let Some(v) = input.monthly_premium {
            active.monthly_premium = Set(v);
        }
        if let Some(v) = input.annual_premium {
            active.annual_premium = Set(v);
        }
        if let Some(v) = input.coverage_amount {
            active.coverage_amount = Set(v);
        }
        if let Some(v) = input.deductible {
            active.deductible = Set(v);
        }
        if let Some(v) = input.insurance_provider {
            active.insurance_provider = Set(v);
        }
        if let Some(v) = input.visible_to_public {
            active.visible_to_public = Set(v);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.rate_repo.update(active).await?;
        Ok(updated.into())
    }

    /// Delete the actor's own submission.
    pub async fn delete(&self, actor: &Actor, rate_id: &str) -> AppResult<()> {
        let existing = self.rate_repo.get_by_id(rate_id).await?;
        actor.require_owner(&existing.user_id, "rates")?;

        self.rate_repo.delete(rate_id).await?;
        tracing::info!(rate_id = %rate_id, user_id = %actor.user_id, "Rate deleted");
        Ok(())
    }

    /// Public submissions with fuzzed locations.
    pub async fn public_rates(&self) -> AppResult<Vec<PublicRate>> {
        let rows = self.rate_repo.find_public().await?;
        Ok(rows.into_iter().map(PublicRate::from).collect())
    }

    /// The actor's submissions, newest first.
    pub async fn my_rates(&self, actor: &Actor) -> AppResult<Vec<RateView>> {
        let rows = self.rate_repo.find_by_user(&actor.user_id).await?;
        Ok(rows.into_iter().map(RateView::from).collect())
    }
}
