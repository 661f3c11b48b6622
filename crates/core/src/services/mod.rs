//! Business logic services.

#![allow(missing_docs)]

pub mod dashboard;
pub mod forum;
pub mod geocoding;
pub mod identity;
pub mod image;
pub mod profile;
pub mod rate;
pub mod username;
pub mod vote;

pub use dashboard::{Dashboard, DashboardService, DashboardStats, RecentPost};
pub use forum::{
    AuthorView, CategoryInfo, CreatePostInput, CreateReplyInput, CreatedPost, DeletedPost,
    ForumService, PostDetail, PostView, UpdatePostInput, UserPosts,
};
pub use geocoding::{AddressSuggestion, GeocodingService, ValidatedAddress};
pub use identity::{
    GoTrueClient, IdentityProvider, IdentityService, IdentityUser, OtpType, Session,
    StaticIdentityProvider,
};
pub use image::{ImageService, UploadedImage};
pub use profile::{OnboardingInput, ProfileResponse, ProfileService};
pub use rate::{PublicRate, RateService, RateView, SubmitRateInput, UpdateRateInput};
pub use username::UsernameService;
pub use vote::VoteService;
