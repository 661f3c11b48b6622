//! Profile service: lazy provisioning, onboarding, and roles.

use chrono::{NaiveDate, Utc};
use ratenextdoor_common::{AppError, AppResult};
use ratenextdoor_db::{
    entities::profile::{self, ProfileRole},
    repositories::ProfileRepository,
};
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::Actor;
use crate::services::identity::IdentityUser;
use crate::validation;

/// Onboarding form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingInput {
    #[validate(length(max = 128, message = "Name must be at most 128 characters"))]
    #[serde(default)]
    pub display_name: String,

    pub date_of_birth: Option<NaiveDate>,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub is_anonymous: bool,
}

/// A profile as shown to its owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    /// Formatted as `(XXX) XXX-XXXX`
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_anonymous: bool,
    pub role: ProfileRole,
    pub onboarding_completed: bool,
    pub email_verified: bool,
}

impl From<profile::Model> for ProfileResponse {
    fn from(p: profile::Model) -> Self {
        Self {
            id: p.id,
            email: p.email,
            username: p.username,
            display_name: p.display_name,
            full_name: p.full_name,
            date_of_birth: p.date_of_birth,
            phone: p.phone.as_deref().map(validation::format_phone),
            avatar_url: p.avatar_url,
            is_anonymous: p.is_anonymous,
            role: p.role,
            onboarding_completed: p.onboarding_completed,
            email_verified: p.email_verified,
        }
    }
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self { profile_repo }
    }

    /// Load the profile for an authenticated identity, creating it on first
    /// sight.
    pub async fn ensure_profile(&self, user: &IdentityUser) -> AppResult<profile::Model> {
        if let Some(existing) = self.profile_repo.find_by_id(&user.id).await? {
            if user.email_verified() && !existing.email_verified {
                let mut active = existing.into_active_model();
                active.email_verified = Set(true);
                active.updated_at = Set(Some(Utc::now().into()));
                return self.profile_repo.update(active).await;
            }
            return Ok(existing);
        }

        let model = profile::ActiveModel {
            id: Set(user.id.clone()),
            email: Set(user.email.clone()),
            username: Set(None),
            display_name: Set(None),
            full_name: Set(None),
            date_of_birth: Set(None),
            phone: Set(None),
            avatar_url: Set(None),
            is_anonymous: Set(false),
            role: Set(ProfileRole::Member),
            onboarding_completed: Set(false),
            email_verified: Set(user.email_verified()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let (profile, inserted) = self.profile_repo.create_if_absent(model).await?;
        if inserted {
            tracing::info!(user_id = %profile.id, "Provisioned profile");
        }
        Ok(profile)
    }

    /// Get the caller's own profile.
    pub async fn get_profile(&self, actor: &Actor) -> AppResult<profile::Model> {
        self.profile_repo.get_by_id(&actor.user_id).await
    }

    /// Complete onboarding.
    ///
    /// `today` anchors the age check so callers control the clock.
    pub async fn complete_onboarding(
        &self,
        actor: &Actor,
        input: OnboardingInput,
        today: NaiveDate,
    ) -> AppResult<profile::Model> {
        input.validate()?;

        let display_name = input.display_name.trim();
        let username = input.username.trim();
        let Some(date_of_birth) = input.date_of_birth else {
            return Err(AppError::Validation("All fields are required".to_string()));
        };
        if display_name.is_empty() || username.is_empty() || input.phone.trim().is_empty() {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        validation::validate_username(username)?;
        let phone = validation::normalize_phone(&input.phone)?;
        validation::validate_adult(date_of_birth, today)?;

        if self
            .profile_repo
            .is_username_taken(username, Some(&actor.user_id))
            .await?
        {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }

        let profile = self.profile_repo.get_by_id(&actor.user_id).await?;
        let mut active = profile.into_active_model();
        active.full_name = Set(Some(display_name.to_string()));
        active.display_name = Set(Some(display_name.to_string()));
        active.date_of_birth = Set(Some(date_of_birth));
        active.phone = Set(Some(phone));
        active.username = Set(Some(username.to_string()));
        active.is_anonymous = Set(input.is_anonymous);
        active.onboarding_completed = Set(true);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.profile_repo.update(active).await?;
        tracing::info!(user_id = %updated.id, "Onboarding completed");
        Ok(updated)
    }

    /// Change another user's role. Admin only.
    pub async fn set_role(
        &self,
        actor: &Actor,
        user_id: &str,
        role: ProfileRole,
    ) -> AppResult<profile::Model> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden("Only admins can change roles".to_string()));
        }

        let mut active = self.profile_repo.get_by_id(user_id).await?.into_active_model();
        active.role = Set(role);
        active.updated_at = Set(Some(Utc::now().into()));
        let updated = self.profile_repo.update(active).await?;

        tracing::info!(user_id = %user_id, role = ?role, by = %actor.user_id, "Role changed");
        Ok(updated)
    }
}
