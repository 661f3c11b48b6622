//! Core business logic for RateNextDoor.

pub mod actor;
pub mod services;
pub mod validation;

pub use actor::Actor;
pub use services::*;
