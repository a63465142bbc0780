//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{OAuthError, OAuthProvider, PostRepository, SessionStore};
use blog_infra::database::{DatabaseConfig, InMemoryPostRepository};
use blog_infra::{GithubProvider, InMemorySessionStore, StateTracker};

#[cfg(feature = "mongodb")]
use blog_infra::database::{DatabaseConnections, MongoPostRepository};

use crate::config::AppConfig;
use crate::sign_in::{SignInFlow, Whitelist};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub states: Arc<StateTracker>,
    pub sign_in: Arc<SignInFlow>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, OAuthError> {
        let posts = post_repository(config.database.as_ref()).await;
        let sessions: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::new(config.session_ttl));
        let states = Arc::new(StateTracker::new(config.state_ttl));
        let provider: Arc<dyn OAuthProvider> = Arc::new(GithubProvider::new(config.oauth.clone())?);

        if config.whitelist.is_empty() {
            tracing::warn!("BLOGAPI_WHITELIST is empty - nobody will be able to sign in");
        }

        tracing::info!("Application state initialized");

        Ok(Self::from_parts(
            posts,
            sessions,
            states,
            provider,
            config.whitelist.clone(),
        ))
    }

    pub fn from_parts(
        posts: Arc<dyn PostRepository>,
        sessions: Arc<dyn SessionStore>,
        states: Arc<StateTracker>,
        provider: Arc<dyn OAuthProvider>,
        whitelist: Whitelist,
    ) -> Self {
        let sign_in = Arc::new(SignInFlow::new(
            provider,
            states.clone(),
            sessions.clone(),
            whitelist,
        ));

        Self {
            posts,
            sessions,
            states,
            sign_in,
        }
    }
}

#[cfg(feature = "mongodb")]
async fn post_repository(db_config: Option<&DatabaseConfig>) -> Arc<dyn PostRepository> {
    let Some(config) = db_config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return Arc::new(InMemoryPostRepository::new());
    };

    match DatabaseConnections::init(config).await {
        Ok(connections) => Arc::new(MongoPostRepository::new(connections.posts())),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            Arc::new(InMemoryPostRepository::new())
        }
    }
}

#[cfg(not(feature = "mongodb"))]
async fn post_repository(_db_config: Option<&DatabaseConfig>) -> Arc<dyn PostRepository> {
    tracing::info!("Running without mongodb feature - using in-memory repository");
    Arc::new(InMemoryPostRepository::new())
}
