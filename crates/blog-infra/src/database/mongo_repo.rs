//! MongoDB post repository.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Collection;
use mongodb::bson::doc;
use uuid::Uuid;

use blog_core::domain::{Post, PostSummary};
use blog_core::error::RepoError;
use blog_core::ports::PostRepository;

use super::document::{PostDocument, PostSummaryDocument};

fn query_error(e: mongodb::error::Error) -> RepoError {
    RepoError::Query(e.to_string())
}

fn write_error(e: mongodb::error::Error) -> RepoError {
    RepoError::Write(e.to_string())
}

/// Posts stored one document per post, keyed by the post id string.
pub struct MongoPostRepository {
    posts: Collection<PostDocument>,
}

impl MongoPostRepository {
    pub fn new(posts: Collection<PostDocument>) -> Self {
        Self { posts }
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let found = self
            .posts
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(query_error)?;

        found.map(Post::try_from).transpose()
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.posts
            .insert_one(PostDocument::from(&post))
            .await
            .map_err(write_error)?;

        tracing::debug!(post_id = %post.id, "Inserted post");
        Ok(post)
    }

    async fn list_summaries(&self, include_drafts: bool) -> Result<Vec<PostSummary>, RepoError> {
        let filter = if include_drafts {
            doc! {}
        } else {
            doc! { "draftmode": false }
        };

        let cursor = self
            .posts
            .clone_with_type::<PostSummaryDocument>()
            .find(filter)
            .projection(doc! { "body": 0 })
            .sort(doc! { "created": -1, "_id": 1 })
            .await
            .map_err(query_error)?;

        let docs: Vec<PostSummaryDocument> = cursor.try_collect().await.map_err(query_error)?;
        docs.into_iter().map(PostSummary::try_from).collect()
    }

    async fn replace(&self, post: Post) -> Result<Post, RepoError> {
        let result = self
            .posts
            .replace_one(doc! { "_id": post.id.to_string() }, PostDocument::from(&post))
            .await
            .map_err(write_error)?;

        if result.matched_count == 0 {
            return Err(RepoError::NotFound);
        }

        tracing::debug!(post_id = %post.id, "Replaced post");
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = self
            .posts
            .delete_one(doc! { "_id": id.to_string() })
            .await
            .map_err(write_error)?;

        if result.deleted_count == 0 {
            return Err(RepoError::NotFound);
        }

        tracing::debug!(post_id = %id, "Deleted post");
        Ok(())
    }
}
