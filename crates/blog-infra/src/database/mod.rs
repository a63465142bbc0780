//! Post persistence - MongoDB in production, a HashMap otherwise.

mod connections;
mod memory_repo;

#[cfg(feature = "mongodb")]
mod document;
#[cfg(feature = "mongodb")]
mod mongo_repo;

pub use connections::DatabaseConfig;
pub use memory_repo::InMemoryPostRepository;

#[cfg(feature = "mongodb")]
pub use connections::DatabaseConnections;
#[cfg(feature = "mongodb")]
pub use document::{PostDocument, PostSummaryDocument};
#[cfg(feature = "mongodb")]
pub use mongo_repo::MongoPostRepository;
