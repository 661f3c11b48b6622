//! The authenticated caller of a service operation.

use ratenextdoor_common::{AppError, AppResult};
use ratenextdoor_db::entities::profile::{self, ProfileRole};

/// Authenticated caller, passed explicitly to every mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: ProfileRole,
}

impl Actor {
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: ProfileRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, ProfileRole::Admin)
    }

    #[must_use]
    pub fn owns(&self, owner_id: &str) -> bool {
        self.user_id == owner_id
    }

    /// Succeeds only for the resource's owner.
    pub fn require_owner(&self, owner_id: &str, what: &str) -> AppResult<()> {
        if self.owns(owner_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("You can only modify your own {what}")))
        }
    }

    /// Succeeds for the resource's owner or an admin.
    pub fn require_owner_or_admin(&self, owner_id: &str, what: &str) -> AppResult<()> {
        if self.owns(owner_id) || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("You can only delete your own {what}")))
        }
    }
}

impl From<&profile::Model> for Actor {
    fn from(profile: &profile::Model) -> Self {
        Self::new(profile.id.clone(), profile.role)
    }
}
