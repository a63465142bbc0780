//! OAuth sign-in flow: state nonce, code exchange, profile check, session.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use blog_core::domain::ProviderToken;
use blog_core::ports::{OAuthError, OAuthProvider, SessionError, SessionStore};
use blog_infra::StateTracker;

/// Logins allowed to finish signing in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist(HashSet<String>);

impl Whitelist {
    /// Parse a comma-separated list; blanks are skipped.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|login| !login.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn contains(&self, login: &str) -> bool {
        self.0.contains(login)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Query parameters the provider sends back to the reply endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthReply {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    /// The provider redirected back with an error instead of a code.
    #[error("error signing in: {0}")]
    ProviderDenied(String),

    #[error("invalid state value returned from oauth provider")]
    InvalidState,

    #[error(transparent)]
    Provider(#[from] OAuthError),

    #[error("login {login} is not whitelisted")]
    NotWhitelisted { login: String },

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct SignInFlow {
    provider: Arc<dyn OAuthProvider>,
    states: Arc<StateTracker>,
    sessions: Arc<dyn SessionStore>,
    whitelist: Whitelist,
}

impl SignInFlow {
    pub fn new(
        provider: Arc<dyn OAuthProvider>,
        states: Arc<StateTracker>,
        sessions: Arc<dyn SessionStore>,
        whitelist: Whitelist,
    ) -> Self {
        Self {
            provider,
            states,
            sessions,
            whitelist,
        }
    }

    /// Issue a fresh state nonce and return the provider URL to redirect to.
    pub async fn begin(&self) -> String {
        let state = self.states.issue().await;
        let url = self.provider.authorize_url(&state);
        tracing::debug!(redirect = %url, "Issued sign-in state");
        url
    }

    /// Finish a sign-in from the provider's reply.
    ///
    /// On success the token has been saved to the session store under its
    /// own access-token string.
    pub async fn complete(&self, reply: OAuthReply) -> Result<ProviderToken, SignInError> {
        if let Some(error) = reply.error.filter(|e| !e.is_empty()) {
            let description = reply
                .error_description
                .filter(|d| !d.is_empty())
                .unwrap_or(error);
            tracing::debug!(error = %description, "Provider refused sign-in");
            return Err(SignInError::ProviderDenied(description));
        }

        let state = reply.state.unwrap_or_default();
        if !self.states.consume(&state).await {
            tracing::debug!("Sign-in reply with unknown or expired state");
            return Err(SignInError::InvalidState);
        }

        let code = reply.code.unwrap_or_default();
        let token = self.provider.exchange_code(&code).await?;
        let profile = self.provider.fetch_profile(&token).await?;

        if !self.whitelist.contains(&profile.login) {
            tracing::warn!(
                login = %profile.login,
                name = ?profile.name,
                id = profile.id,
                "Rejected sign-in from user outside the whitelist"
            );
            return Err(SignInError::NotWhitelisted {
                login: profile.login,
            });
        }

        self.sessions.save(&token.access_token, token.clone()).await?;
        tracing::info!(login = %profile.login, "User signed in");
        Ok(token)
    }
}
