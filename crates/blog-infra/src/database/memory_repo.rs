//! In-memory post repository - used when no database is configured, and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Post, PostSummary};
use blog_core::error::RepoError;
use blog_core::ports::PostRepository;

/// Posts held in a HashMap behind an async RwLock. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepoError::Write(format!("duplicate post id {}", post.id)));
        }
        posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list_summaries(&self, include_drafts: bool) -> Result<Vec<PostSummary>, RepoError> {
        let posts = self.posts.read().await;
        let mut summaries: Vec<PostSummary> = posts
            .values()
            .filter(|post| include_drafts || !post.draft_mode)
            .map(Post::summary)
            .collect();

        summaries.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }

    async fn replace(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let slot = posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.posts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
