//! Repositories wrapping database access per entity.

pub mod forum_post;
pub mod forum_vote;
pub mod profile;
pub mod rate_submission;

pub use forum_post::{ForumPostRepository, PostListQuery, PostSort};
pub use forum_vote::{ForumVoteRepository, VoteOutcome};
pub use profile::ProfileRepository;
pub use rate_submission::RateSubmissionRepository;
