//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpRequest, HttpResponse, ResponseError, error, http::StatusCode, web};
use blog_shared::ErrorResponse;
use std::fmt;

use blog_core::error::{DomainError, RepoError};

use crate::sign_in::SignInError;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    /// Unknown post. Answered with 400, not 404.
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    MethodNotAllowed,
    /// Failure reported by the OAuth provider; the detail is shown to the caller.
    Upstream(String),
    /// Anything else on our side; the detail is only logged.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
            AppError::Upstream(msg) => write!(f, "Upstream error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::bad_request(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::MethodNotAllowed => ErrorResponse::method_not_allowed(),
            AppError::Upstream(detail) => {
                tracing::error!("Upstream error: {}", detail);
                ErrorResponse::internal_error().with_detail(detail)
            }
            AppError::Internal(detail) => {
                // Log internal errors
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Repository(e) => e.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Write(msg) => {
                tracing::error!("Database write error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<SignInError> for AppError {
    fn from(err: SignInError) -> Self {
        match err {
            SignInError::InvalidState => AppError::BadRequest(err.to_string()),
            SignInError::NotWhitelisted { .. } => AppError::Unauthorized,
            SignInError::ProviderDenied(_) | SignInError::Provider(_) => {
                AppError::Upstream(err.to_string())
            }
            SignInError::Session(e) => AppError::Internal(e.to_string()),
        }
    }
}

/// Route JSON body decode failures through [`AppError::BadRequest`].
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
            AppError::BadRequest(err.to_string()).into()
        })
}

/// Route malformed path segments (e.g. a post id that is not a UUID) through
/// [`AppError::BadRequest`].
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: error::PathError, _req: &HttpRequest| {
        AppError::BadRequest(format!("invalid post id: {err}")).into()
    })
}

/// Default service for known resources hit with an unsupported method.
pub async fn method_not_allowed() -> AppResult<HttpResponse> {
    Err(AppError::MethodNotAllowed)
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use uuid::Uuid;

    use blog_core::ports::OAuthError;

    use super::*;

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_missing_post_is_bad_request() {
        let err = AppError::from(DomainError::post_not_found(Uuid::nil()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_sign_in_error_statuses() {
        let cases = [
            (SignInError::InvalidState, StatusCode::BAD_REQUEST),
            (
                SignInError::NotWhitelisted {
                    login: "mallory".to_string(),
                },
                StatusCode::UNAUTHORIZED,
            ),
            (
                SignInError::ProviderDenied("access_denied".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SignInError::Provider(OAuthError::Timeout),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }

    #[actix_rt::test]
    async fn test_provider_detail_is_passed_through() {
        let err = AppError::from(SignInError::Provider(OAuthError::Exchange(
            "bad_verification_code".to_string(),
        )));
        let body = body_of(err).await;

        assert_eq!(body["status"], 500);
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .contains("bad_verification_code")
        );
    }

    #[actix_rt::test]
    async fn test_database_detail_is_hidden() {
        let err = AppError::from(RepoError::Write("E11000 duplicate key".to_string()));
        let body = body_of(err).await;

        assert_eq!(body["status"], 500);
        assert!(body.get("detail").is_none());
    }

    #[actix_rt::test]
    async fn test_non_whitelisted_body_is_generic() {
        let body = body_of(AppError::from(SignInError::NotWhitelisted {
            login: "mallory".to_string(),
        }))
        .await;

        assert_eq!(body["status"], 401);
        assert!(!body.to_string().contains("mallory"));
    }
}
