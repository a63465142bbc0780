//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod oauth;
mod repository;
mod session;

pub use auth::AuthError;
pub use oauth::{OAuthError, OAuthProvider, ProviderProfile};
pub use repository::PostRepository;
pub use session::{SessionError, SessionStore};
