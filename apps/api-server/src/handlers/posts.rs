//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::{NewPost, Post, PostUpdate};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /post/{id}
pub async fn get_post(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.get_by_id(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /post/ - no id given.
pub async fn missing_post_id() -> AppResult<HttpResponse> {
    Err(AppError::BadRequest("missing post id".to_string()))
}

/// POST /post/ - Protected route
pub async fn create_post(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<NewPost>,
) -> AppResult<HttpResponse> {
    let post = Post::new(body.into_inner())?;
    let post = state.posts.insert(post).await?;

    tracing::info!(post_id = %post.id, "Post created");
    Ok(HttpResponse::Created().json(post))
}

/// PATCH /post/{id} - Protected route
pub async fn update_post(
    state: web::Data<AppState>,
    _identity: Identity,
    id: web::Path<Uuid>,
    body: web::Json<PostUpdate>,
) -> AppResult<HttpResponse> {
    let post = state.posts.update(id.into_inner(), body.into_inner()).await?;

    tracing::info!(post_id = %post.id, "Post updated");
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /post/{id} - Protected route
pub async fn delete_post(
    state: web::Data<AppState>,
    _identity: Identity,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = id.into_inner();
    // Unknown ids answer the same way as they do on GET.
    state.posts.get_by_id(id).await?;
    state.posts.delete(id).await?;

    tracing::info!(post_id = %id, "Post deleted");
    Ok(HttpResponse::Ok().finish())
}

/// GET /all - drafts are included for authenticated callers.
pub async fn list_posts(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let include_drafts = identity.0.is_some();
    let summaries = state.posts.list_summaries(include_drafts).await?;
    Ok(HttpResponse::Ok().json(summaries))
}
