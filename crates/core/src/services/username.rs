//! Username availability and suggestions.

use chrono::Utc;
use rand::Rng;
use ratenextdoor_common::AppResult;
use ratenextdoor_db::repositories::ProfileRepository;

use crate::validation;

const ADJECTIVES: [&str; 20] = [
    "Quick", "Silent", "Brave", "Calm", "Bold", "Smart", "Swift", "Wise", "Cool", "Happy",
    "Bright", "Noble", "Keen", "Clever", "Mighty", "Fresh", "Wild", "Free", "True", "Pure",
];

const NOUNS: [&str; 20] = [
    "Tiger", "Eagle", "Lion", "Wolf", "Bear", "Hawk", "Fox", "Owl", "Deer", "Puma", "Falcon",
    "Panther", "Lynx", "Raven", "Phoenix", "Dragon", "Shark", "Cobra", "Viper", "Otter",
];

/// Number of suggestions offered at once.
pub const SUGGESTION_COUNT: usize = 3;

/// Candidates tried per suggestion before falling back.
const MAX_ATTEMPTS: usize = 10;

/// Username service.
#[derive(Clone)]
pub struct UsernameService {
    profile_repo: ProfileRepository,
}

impl UsernameService {
    #[must_use]
    pub const fn new(profile_repo: ProfileRepository) -> Self {
        Self { profile_repo }
    }

    /// Whether `username` is valid and unclaimed.
    ///
    /// Invalid usernames fail with [`ratenextdoor_common::AppError::Validation`].
    pub async fn check(&self, username: &str) -> AppResult<bool> {
        validation::validate_username(username)?;
        let taken = self.profile_repo.is_username_taken(username, None).await?;
        Ok(!taken)
    }

    /// Suggest unclaimed usernames like `SwiftOtter4821`.
    pub async fn suggest(&self) -> AppResult<Vec<String>> {
        let mut suggestions = Vec::with_capacity(SUGGESTION_COUNT);
        for _ in 0..SUGGESTION_COUNT {
            suggestions.push(self.unique_suggestion().await?);
        }
        Ok(suggestions)
    }

    async fn unique_suggestion(&self) -> AppResult<String> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = random_candidate();
            if !self.profile_repo.is_username_taken(&candidate, None).await? {
                return Ok(candidate);
            }
        }

        tracing::debug!("No free username suggestion found, using timestamp fallback");
        Ok(format!("User{}", Utc::now().timestamp_millis()))
    }
}

fn random_candidate() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    let number: u16 = rng.gen_range(1000..=9999);
    format!("{adjective}{noun}{number}")
}
