use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Seconds before its stated expiry that a token stops being accepted.
const EXPIRY_DELTA_SECS: i64 = 10;

/// Access token issued by the OAuth provider, as kept in the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderToken {
    pub access_token: String,
    pub token_type: String,
    /// `None` when the provider did not say when the token expires.
    pub expiry: Option<DateTime<Utc>>,
}

impl ProviderToken {
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expiry: None,
        }
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expiry
            .map(|exp| exp - TimeDelta::seconds(EXPIRY_DELTA_SECS) < Utc::now())
            .unwrap_or(false)
    }

    /// A token is usable when it carries a secret and has not expired.
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }
}
