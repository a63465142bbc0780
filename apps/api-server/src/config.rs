//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use blog_infra::database::DatabaseConfig;
use blog_infra::oauth::GithubConfig;

use crate::sign_in::Whitelist;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("TLS_CERT and TLS_KEY must be set together")]
    PartialTls,
}

/// PEM files for serving HTTPS.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub oauth: GithubConfig,
    pub state_ttl: Duration,
    pub state_purge_interval: Duration,
    pub session_ttl: Duration,
    pub session_purge_interval: Duration,
    pub whitelist: Whitelist,
    pub tls: Option<TlsConfig>,
    /// `None` keeps posts in memory.
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = parse_or(&var, "PORT", 8080)?;

        let client_id = var("CLIENT_ID").ok_or(ConfigError::Missing("CLIENT_ID"))?;
        let client_secret = var("CLIENT_SECRET").ok_or(ConfigError::Missing("CLIENT_SECRET"))?;
        let redirect_url = var("OAUTH_REDIRECT_URL")
            .unwrap_or_else(|| format!("https://{host}:{port}/oauth/reply"));
        let mut oauth = GithubConfig::new(client_id, client_secret, redirect_url);
        oauth.timeout = parse_secs(&var, "OAUTH_TIMEOUT_SECS", 10, 1)?;

        let tls = match (var("TLS_CERT"), var("TLS_KEY")) {
            (Some(cert), Some(key)) => Some(TlsConfig {
                cert_path: cert.into(),
                key_path: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        let database = match var("DATABASE_URL") {
            Some(url) => {
                let mut database = DatabaseConfig::new(url);
                if let Some(name) = var("DATABASE_NAME") {
                    database.database = name;
                }
                if let Some(collection) = var("DATABASE_COLLECTION") {
                    database.collection = collection;
                }
                Some(database)
            }
            None => None,
        };

        Ok(Self {
            host,
            port,
            oauth,
            state_ttl: parse_secs(&var, "OAUTH_STATE_TTL_SECS", 300, 1)?,
            state_purge_interval: parse_secs(&var, "OAUTH_STATE_PURGE_SECS", 10, 1)?,
            session_ttl: parse_secs(&var, "SESSION_TTL_MINUTES", 120, 60)?,
            session_purge_interval: parse_secs(&var, "SESSION_PURGE_SECS", 60, 1)?,
            whitelist: Whitelist::parse(&var("BLOGAPI_WHITELIST").unwrap_or_default()),
            tls,
            database,
        })
    }
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Longest accepted TTL, timeout or interval: one year.
const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Parse a positive count of `unit_secs`-long units into a [`Duration`].
fn parse_secs(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
    unit_secs: u64,
) -> Result<Duration, ConfigError> {
    let units: u64 = parse_or(var, key, default)?;
    units
        .checked_mul(unit_secs)
        .filter(|secs| (1..=MAX_DURATION_SECS).contains(secs))
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            key,
            value: units.to_string(),
        })
}
