//! Sign-in handlers.

use actix_web::{HttpResponse, http::header, web};

use blog_shared::AccessTokenResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::sign_in::OAuthReply;
use crate::state::AppState;

/// GET /oauth/signin
pub async fn sign_in(state: web::Data<AppState>) -> HttpResponse {
    let redirect = state.sign_in.begin().await;
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, redirect))
        .finish()
}

/// GET /oauth/reply - the provider redirects the browser here.
pub async fn reply(
    state: web::Data<AppState>,
    query: web::Query<OAuthReply>,
) -> AppResult<HttpResponse> {
    let token = state.sign_in.complete(query.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .insert_header((header::AUTHORIZATION, token.access_token.clone()))
        .json(AccessTokenResponse {
            access_token: token.access_token,
        }))
}

/// POST /oauth/signout - Protected route
pub async fn sign_out(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state
        .sessions
        .delete(&identity.access_token)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!("Session ended");
    Ok(HttpResponse::Ok().finish())
}
