//! OAuth provider port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ProviderToken;

/// The signed-in user's profile as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub id: u64,
}

/// Third-party OAuth provider used for sign-in.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Authorization URL the user is redirected to, carrying `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, OAuthError>;

    /// Fetch the profile of the user the token belongs to.
    async fn fetch_profile(&self, token: &ProviderToken) -> Result<ProviderProfile, OAuthError>;
}

/// OAuth provider errors.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("error getting access token: {0}")]
    Exchange(String),

    #[error("error getting profile: {0}")]
    Profile(String),

    #[error("request to provider timed out")]
    Timeout,

    #[error("invalid provider configuration: {0}")]
    Config(String),
}
