//! Authentication and authorization ports.

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access token missing or unknown")]
    MissingOrUnknownToken,

    #[error("Access token expired")]
    ExpiredToken,

    #[error("Session backend error: {0}")]
    Backend(String),
}
