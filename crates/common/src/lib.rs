//! Common utilities and shared types for RateNextDoor.
//!
//! This crate provides foundational components used across all RateNextDoor crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: File storage backends for uploaded images
//! - **Votes**: The forum vote transition table shared by the server and
//!   optimistic clients
//!
//! # Example
//!
//! ```no_run
//! use ratenextdoor_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;
pub mod vote;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, StorageBackend, StorageConfig, UploadedFile, generate_storage_key};
pub use vote::{CounterDelta, OptimisticVote, VoteAction, VoteDirection, VoteState, transition};
