//! Domain entities - the core business objects.

mod post;
mod session;

pub use post::{NewPost, Post, PostSummary, PostUpdate};
pub use session::ProviderToken;
