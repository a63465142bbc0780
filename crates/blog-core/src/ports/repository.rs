use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostSummary, PostUpdate};
use crate::error::{DomainError, RepoError};

/// Post repository - storage for blog posts.
///
/// Implementations provide the storage primitives; lookup-or-fail and the
/// read-modify-write update are shared.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post by its unique ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Store a newly created post.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    /// All posts without their bodies, newest first.
    async fn list_summaries(&self, include_drafts: bool) -> Result<Vec<PostSummary>, RepoError>;

    /// Overwrite a stored post with `post`. Fails with `NotFound` if it is gone.
    async fn replace(&self, post: Post) -> Result<Post, RepoError>;

    /// Delete a post by its ID. Fails with `NotFound` if nothing was removed.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Post, DomainError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    /// Fetch, merge and rewrite a post.
    ///
    /// Not isolated: a concurrent writer's change to fields this update does
    /// not touch (e.g. `views`) can be lost when both rewrite the document.
    async fn update(&self, id: Uuid, update: PostUpdate) -> Result<Post, DomainError> {
        let mut post = self.get_by_id(id).await?;
        post.apply_update(update)?;

        match self.replace(post).await {
            Ok(post) => Ok(post),
            Err(RepoError::NotFound) => Err(DomainError::post_not_found(id)),
            Err(e) => Err(e.into()),
        }
    }
}
