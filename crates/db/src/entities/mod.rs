//! Database entities.

pub mod forum_post;
pub mod forum_vote;
pub mod profile;
pub mod rate_submission;

pub use forum_post::Entity as ForumPost;
pub use forum_vote::Entity as ForumVote;
pub use profile::Entity as Profile;
pub use rate_submission::Entity as RateSubmission;
