//! ID generation utilities.

use ulid::Ulid;

/// Number of trailing ID characters appended to post slugs.
pub const SLUG_SUFFIX_LEN: usize = 6;

/// ID generator for posts, votes and rate submissions.
///
/// Profile IDs are not generated here; they are the identity provider's
/// user IDs.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new lowercase ULID.
    ///
    /// ULIDs sort by creation time, so ordering by ID matches ordering by
    /// `created_at` for rows created on the same node.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// The random tail of an ID, used to keep slugs unique.
    #[must_use]
    pub fn slug_suffix(id: &str) -> &str {
        let start = id.len().saturating_sub(SLUG_SUFFIX_LEN);
        id.get(start..).unwrap_or(id)
    }
}
