//! Pure validators shared by services and request handlers.
//!
//! Every function here is total and side-effect free. Failures are reported
//! as [`AppError::Validation`] carrying the message shown to the user.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use ratenextdoor_common::{AppError, AppResult};
use regex::Regex;
use validator::ValidationError;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

pub const MIN_AGE_YEARS: i32 = 18;

pub const POST_TITLE_MIN_LEN: usize = 5;
pub const POST_TITLE_MAX_LEN: usize = 200;
pub const POST_BODY_MIN_LEN: usize = 10;
pub const REPLY_BODY_MIN_LEN: usize = 1;

/// Longest slug stem before the ID suffix is appended.
pub const SLUG_STEM_MAX_LEN: usize = 60;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_IMAGES_PER_POST: usize = 5;

/// Accepted image types and the file extension stored for each.
pub const ALLOWED_IMAGE_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

static USERNAME_CHARSET: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Za-z0-9_]+$").unwrap()
});

static STATE_CODE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Z]{2}$").unwrap()
});

static ZIP_CODE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[0-9]{5}$").unwrap()
});

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

// ==================== Profile ====================

/// Check a username's length and charset. Uniqueness is checked separately.
pub fn validate_username(username: &str) -> AppResult<()> {
    if username.is_empty() {
        return Err(invalid("Username is required"));
    }

    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(invalid("Username must be between 3 and 20 characters"));
    }

    if !USERNAME_CHARSET.is_match(username) {
        return Err(invalid(
            "Username can only contain letters, numbers, and underscores",
        ));
    }

    Ok(())
}

/// Reduce a phone number to its 10 US digits.
///
/// Formatting characters are ignored and a leading `1` country code is
/// dropped, so `"(555) 123-4567"`, `"555.123.4567"` and `"+1 555 123 4567"`
/// all normalize to `"5551234567"`.
pub fn normalize_phone(input: &str) -> AppResult<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    let national = match digits.len() {
        10 => digits,
        11 if digits.starts_with('1') => digits[1..].to_string(),
        _ => return Err(invalid("Please enter a valid 10-digit US phone number")),
    };

    Ok(national)
}

/// Format 10 stored digits as `(XXX) XXX-XXXX`. Anything else is returned
/// unchanged.
#[must_use]
pub fn format_phone(digits: &str) -> String {
    if digits.len() != 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return digits.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

/// Whole years between `birth` and `today`.
///
/// One less than the year difference until this year's birthday has
/// passed. A Feb 29 birthday counts as reached on Mar 1 in common years.
#[must_use]
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Require a birth date at least [`MIN_AGE_YEARS`] before `today`.
pub fn validate_adult(birth: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if birth > today {
        return Err(invalid("Date of birth cannot be in the future"));
    }
    if age_on(birth, today) < MIN_AGE_YEARS {
        return Err(invalid("You must be at least 18 years old to use RateNextDoor"));
    }
    Ok(())
}

// ==================== Forum ====================

pub fn validate_post_title(title: &str) -> AppResult<()> {
    let len = title.trim().chars().count();
    if len < POST_TITLE_MIN_LEN {
        return Err(invalid("Title must be at least 5 characters"));
    }
    if len > POST_TITLE_MAX_LEN {
        return Err(invalid("Title must be at most 200 characters"));
    }
    Ok(())
}

pub fn validate_post_body(content: &str) -> AppResult<()> {
    if content.trim().chars().count() < POST_BODY_MIN_LEN {
        return Err(invalid("Content must be at least 10 characters"));
    }
    Ok(())
}

pub fn validate_reply_body(content: &str) -> AppResult<()> {
    if content.trim().chars().count() < REPLY_BODY_MIN_LEN {
        return Err(invalid("Reply cannot be empty"));
    }
    Ok(())
}

/// URL slug for a post: the title's ASCII alphanumerics, lowercased, with
/// everything else collapsed to single dashes, followed by the ID suffix.
#[must_use]
pub fn slugify(title: &str, suffix: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }

    stem.truncate(SLUG_STEM_MAX_LEN);
    let stem = stem.trim_end_matches('-');
    let stem = if stem.is_empty() { "post" } else { stem };

    format!("{stem}-{suffix}")
}

/// Check an uploaded image and return the extension to store it under.
pub fn validate_image(content_type: &str, size: usize) -> AppResult<&'static str> {
    let extension = ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| invalid("Only JPEG, PNG, GIF, and WebP images are allowed"))?;

    if size == 0 {
        return Err(invalid("Image is empty"));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(invalid("Image must be smaller than 5MB"));
    }

    Ok(extension)
}

pub fn validate_image_count(count: usize) -> AppResult<()> {
    if count > MAX_IMAGES_PER_POST {
        return Err(invalid("A post can have at most 5 images"));
    }
    Ok(())
}

// ==================== Rates ====================

/// `validator` hook: two uppercase letters.
pub fn validate_state_code(state: &str) -> Result<(), ValidationError> {
    if STATE_CODE.is_match(state) {
        Ok(())
    } else {
        Err(ValidationError::new("state").with_message("State must be a 2-letter code".into()))
    }
}

/// `validator` hook: five digits.
pub fn validate_zip_code(zip: &str) -> Result<(), ValidationError> {
    if ZIP_CODE.is_match(zip) {
        Ok(())
    } else {
        Err(ValidationError::new("zip_code").with_message("ZIP code must be 5 digits".into()))
    }
}

/// Reject construction years after the current one.
pub fn validate_year_built(year: i32, today: NaiveDate) -> AppResult<()> {
    if year > today.year() {
        return Err(invalid("Year built cannot be in the future"));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_username() {
        assert!(validate_username("ab_12").is_ok());
        assert!(validate_username("QuickFox1234").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username("a".repeat(21).as_str()).is_err());
        assert!(validate_username("a".repeat(20).as_str()).is_ok());
        assert!(validate_username("dash-name").is_err());
    }

    #[test]
    fn test_phone_normalization() {
        assert_eq!(normalize_phone("(555) 123-4567").unwrap(), "5551234567");
        assert_eq!(normalize_phone("5551234567").unwrap(), "5551234567");
        assert_eq!(normalize_phone("+1 555.123.4567").unwrap(), "5551234567");
        assert!(normalize_phone("123-4567").is_err());
        assert!(normalize_phone("25551234567").is_err());
        assert!(normalize_phone("").is_err());
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("12345"), "12345");
    }

    #[test]
    fn test_age_gate_boundary() {
        let today = date(2026, 10, 16);
        assert!(validate_adult(date(2008, 10, 16), today).is_ok());
        assert!(validate_adult(date(2008, 10, 17), today).is_err());
        assert!(validate_adult(date(1970, 1, 1), today).is_ok());
        assert!(validate_adult(date(2027, 1, 1), today).is_err());
    }

    #[test]
    fn test_age_on() {
        assert_eq!(age_on(date(2000, 6, 15), date(2026, 6, 14)), 25);
        assert_eq!(age_on(date(2000, 6, 15), date(2026, 6, 15)), 26);
        // Leap-day birthdays are reached on Mar 1 in common years
        assert_eq!(age_on(date(2008, 2, 29), date(2026, 2, 28)), 17);
        assert_eq!(age_on(date(2008, 2, 29), date(2026, 3, 1)), 18);
    }

    #[test]
    fn test_post_lengths() {
        assert!(validate_post_title("abcd").is_err());
        assert!(validate_post_title("abcde").is_ok());
        assert!(validate_post_title(&"x".repeat(201)).is_err());
        assert!(validate_post_body("123456789").is_err());
        assert!(validate_post_body("1234567890").is_ok());
        assert!(validate_reply_body("k").is_ok());
        assert!(validate_reply_body("   ").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello", "abc123"), "hello-abc123");
        assert_eq!(
            slugify("Why did my premium go UP 30%?!", "x1y2z3"),
            "why-did-my-premium-go-up-30-x1y2z3"
        );
        assert_eq!(slugify("¿¿¿!!!", "x1y2z3"), "post-x1y2z3");
        let long = slugify(&"word ".repeat(40), "suffix");
        assert!(long.len() <= SLUG_STEM_MAX_LEN + 1 + "suffix".len());
        assert!(!long.contains("--"));
    }

    #[test]
    fn test_validate_image() {
        assert_eq!(validate_image("image/png", 1024).unwrap(), "png");
        assert_eq!(validate_image("image/jpeg", MAX_IMAGE_BYTES).unwrap(), "jpg");
        assert!(validate_image("image/svg+xml", 1024).is_err());
        assert!(validate_image("image/png", MAX_IMAGE_BYTES + 1).is_err());
        assert!(validate_image("image/png", 0).is_err());
        assert!(validate_image_count(5).is_ok());
        assert!(validate_image_count(6).is_err());
    }

    #[test]
    fn test_rate_field_hooks() {
        assert!(validate_state_code("TX").is_ok());
        assert!(validate_state_code("Texas").is_err());
        assert!(validate_zip_code("78701").is_ok());
        assert!(validate_zip_code("7870").is_err());
        assert!(validate_year_built(2026, date(2026, 10, 16)).is_ok());
        assert!(validate_year_built(2027, date(2026, 10, 16)).is_err());
    }
}
