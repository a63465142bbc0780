//! Authentication middleware and extractors.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;
use serde::Deserialize;

use blog_core::domain::ProviderToken;
use blog_core::ports::{AuthError, SessionError, SessionStore};

use crate::state::AppState;

/// Query parameter checked when no `Authorization` header is sent.
pub const AUTH_QUERY_PARAM: &str = "auth";

/// Authenticated caller.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.token.token_type)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    /// The credential the caller presented, without any scheme prefix.
    pub access_token: String,
    pub token: ProviderToken,
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match &self.0 {
            AuthError::MissingOrUnknownToken => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::ExpiredToken => actix_web::http::StatusCode::UNAUTHORIZED,
            AuthError::Backend(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        use blog_shared::ErrorResponse;

        let error = match &self.0 {
            AuthError::MissingOrUnknownToken => ErrorResponse::unauthorized()
                .with_detail("Please provide a valid access token."),
            AuthError::ExpiredToken => ErrorResponse::unauthorized()
                .with_detail("Your access token has expired. Please sign in again."),
            AuthError::Backend(msg) => {
                tracing::error!("Session backend error: {}", msg);
                ErrorResponse::internal_error()
            }
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

#[derive(Deserialize)]
struct AuthQuery {
    auth: Option<String>,
}

fn strip_bearer(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => raw[7..].trim_start(),
        _ => raw,
    }
}

/// Credential sent with the request: the `Authorization` header, else the
/// `auth` query parameter. A `Bearer ` prefix is removed from either.
pub fn bearer_credential(req: &HttpRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(strip_bearer)
        .filter(|token| !token.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    web::Query::<AuthQuery>::from_query(req.query_string())
        .ok()
        .and_then(|query| query.into_inner().auth)
        .map(|raw| strip_bearer(&raw).to_string())
        .filter(|token| !token.is_empty())
}

/// Check a credential against the session store. Read-only.
pub async fn authorize(
    sessions: &dyn SessionStore,
    credential: Option<&str>,
) -> Result<Identity, AuthError> {
    let access_token = credential.ok_or(AuthError::MissingOrUnknownToken)?;

    let token = match sessions.get(access_token).await {
        Ok(token) => token,
        Err(SessionError::NotFound) => return Err(AuthError::MissingOrUnknownToken),
        Err(SessionError::Backend(msg)) => return Err(AuthError::Backend(msg)),
    };

    if !token.is_valid() {
        tracing::warn!(expiry = ?token.expiry, "Rejected expired access token");
        return Err(AuthError::ExpiredToken);
    }

    Ok(Identity {
        access_token: access_token.to_string(),
        token,
    })
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Get the session store from app data
        let sessions = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.sessions.clone(),
            None => {
                tracing::error!("AppState not found in app data");
                return Box::pin(async {
                    Err(AuthenticationError(AuthError::Backend(
                        "Server configuration error".to_string(),
                    )))
                });
            }
        };
        let credential = bearer_credential(req);

        Box::pin(async move {
            authorize(sessions.as_ref(), credential.as_deref())
                .await
                .map_err(AuthenticationError)
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);
        Box::pin(async move { Ok(OptionalIdentity(identity.await.ok())) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::test::TestRequest;
    use chrono::{TimeDelta, Utc};

    use blog_infra::InMemorySessionStore;

    use super::*;

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc"), "abc");
        assert_eq!(strip_bearer("bearer abc"), "abc");
        assert_eq!(strip_bearer("BEARER  abc "), "abc");
        assert_eq!(strip_bearer("abc"), "abc");
        assert_eq!(strip_bearer("Bearerabc"), "Bearerabc");
        assert_eq!(strip_bearer("é"), "é");
    }

    #[test]
    fn test_credential_prefers_header() {
        let req = TestRequest::get()
            .uri("/all?auth=from-query")
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_http_request();

        assert_eq!(bearer_credential(&req).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_credential_falls_back_to_query() {
        let req = TestRequest::get()
            .uri("/all?auth=Bearer%20from-query")
            .to_http_request();

        assert_eq!(bearer_credential(&req).as_deref(), Some("from-query"));
    }

    #[test]
    fn test_no_credential() {
        let req = TestRequest::get().uri("/all?other=1").to_http_request();
        assert!(bearer_credential(&req).is_none());
    }

    #[tokio::test]
    async fn test_authorize_known_token() {
        let sessions = InMemorySessionStore::new(Duration::from_secs(60));
        let token = ProviderToken::new("gho_abc", "bearer");
        sessions.save("gho_abc", token.clone()).await.unwrap();

        let identity = authorize(&sessions, Some("gho_abc")).await.unwrap();

        assert_eq!(identity.access_token, "gho_abc");
        assert_eq!(identity.token, token);
    }

    #[tokio::test]
    async fn test_authorize_absent_token() {
        let sessions = InMemorySessionStore::new(Duration::from_secs(60));

        assert!(matches!(
            authorize(&sessions, Some("unknown")).await,
            Err(AuthError::MissingOrUnknownToken)
        ));
        assert!(matches!(
            authorize(&sessions, None).await,
            Err(AuthError::MissingOrUnknownToken)
        ));
    }

    #[tokio::test]
    async fn test_authorize_expired_provider_token() {
        let sessions = InMemorySessionStore::new(Duration::from_secs(60));
        let token = ProviderToken::new("gho_old", "bearer")
            .with_expiry(Utc::now() - TimeDelta::minutes(5));
        sessions.save("gho_old", token).await.unwrap();

        assert!(matches!(
            authorize(&sessions, Some("gho_old")).await,
            Err(AuthError::ExpiredToken)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_authorize_after_session_ttl() {
        let sessions = InMemorySessionStore::new(Duration::from_secs(60));
        sessions
            .save("gho_abc", ProviderToken::new("gho_abc", "bearer"))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(matches!(
            authorize(&sessions, Some("gho_abc")).await,
            Err(AuthError::MissingOrUnknownToken)
        ));
    }
}
