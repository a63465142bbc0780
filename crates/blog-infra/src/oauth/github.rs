//! GitHub as the sign-in provider.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use reqwest::header::{ACCEPT, USER_AGENT};

use blog_core::domain::ProviderToken;
use blog_core::ports::{OAuthError, OAuthProvider, ProviderProfile};

pub const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_USER_API_URL: &str = "https://api.github.com/user";

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("blog-api/", env!("CARGO_PKG_VERSION"));

/// OAuth application settings for GitHub.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_api_url: String,
    /// Applies to each provider call separately.
    pub timeout: Duration,
}

impl GithubConfig {
    /// Config pointing at github.com with a 10 second timeout.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            auth_url: GITHUB_AUTH_URL.to_string(),
            token_url: GITHUB_TOKEN_URL.to_string(),
            user_api_url: GITHUB_USER_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct GithubProvider {
    oauth: BasicClient,
    http: reqwest::Client,
    user_api_url: String,
    timeout: Duration,
}

impl GithubProvider {
    pub fn new(config: GithubConfig) -> Result<Self, OAuthError> {
        let auth_url = AuthUrl::new(config.auth_url)
            .map_err(|e| OAuthError::Config(format!("auth url: {e}")))?;
        let token_url = TokenUrl::new(config.token_url)
            .map_err(|e| OAuthError::Config(format!("token url: {e}")))?;
        let redirect_url = RedirectUrl::new(config.redirect_url)
            .map_err(|e| OAuthError::Config(format!("redirect url: {e}")))?;

        let oauth = BasicClient::new(
            ClientId::new(config.client_id),
            Some(ClientSecret::new(config.client_secret)),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(redirect_url);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OAuthError::Config(format!("http client: {e}")))?;

        Ok(Self {
            oauth,
            http,
            user_api_url: config.user_api_url,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl OAuthProvider for GithubProvider {
    fn authorize_url(&self, state: &str) -> String {
        let (url, _) = self
            .oauth
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scope(Scope::new("read:user".to_string()))
            .url();
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderToken, OAuthError> {
        let request = self
            .oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client);

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| OAuthError::Timeout)?
            .map_err(exchange_error)?;

        let mut token = ProviderToken::new(
            response.access_token().secret().clone(),
            response.token_type().as_ref(),
        );
        if let Some(expiry) = response
            .expires_in()
            .and_then(|d| TimeDelta::from_std(d).ok())
            .and_then(|d| Utc::now().checked_add_signed(d))
        {
            token = token.with_expiry(expiry);
        }

        tracing::debug!(token_type = %token.token_type, expiry = ?token.expiry, "Exchanged authorization code");
        Ok(token)
    }

    async fn fetch_profile(&self, token: &ProviderToken) -> Result<ProviderProfile, OAuthError> {
        let profile_error = |e: reqwest::Error| {
            if e.is_timeout() {
                OAuthError::Timeout
            } else {
                OAuthError::Profile(e.to_string())
            }
        };

        let response = self
            .http
            .get(&self.user_api_url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(profile_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OAuthError::Profile(format!(
                "provider answered {status} for the user profile"
            )));
        }

        response
            .json::<ProviderProfile>()
            .await
            .map_err(profile_error)
    }
}

/// GitHub reports a rejected code with status 200 and an error body, which
/// the oauth2 client only sees as an unparseable token response.
fn exchange_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> OAuthError
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(resp) => OAuthError::Exchange(resp.to_string()),
        RequestTokenError::Parse(parse_err, body) => {
            match serde_json::from_slice::<BasicErrorResponse>(&body) {
                Ok(resp) => OAuthError::Exchange(resp.to_string()),
                Err(_) => OAuthError::Exchange(format!("unreadable token response: {parse_err}")),
            }
        }
        other => OAuthError::Exchange(other.to_string()),
    }
}
