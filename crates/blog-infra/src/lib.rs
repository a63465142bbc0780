//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`:
//! post repositories, the in-memory session and sign-in state stores,
//! and the GitHub OAuth client.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external database, in-memory only
//! - `mongodb` - MongoDB post repository

pub mod cache;
pub mod database;
pub mod oauth;

pub use cache::{InMemorySessionStore, StateTracker};
pub use database::{DatabaseConfig, InMemoryPostRepository};
pub use oauth::{GithubConfig, GithubProvider};

#[cfg(feature = "mongodb")]
pub use database::{DatabaseConnections, MongoPostRepository};
