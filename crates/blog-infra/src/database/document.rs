//! BSON document shapes for the posts collection.

use chrono::Utc;
use mongodb::bson;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use blog_core::domain::{Post, PostSummary};
use blog_core::error::RepoError;

/// Stored form of a post. Dates are BSON datetimes so the server can sort on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: String,
    pub title: String,
    pub created: bson::DateTime,
    pub edited: Option<bson::DateTime>,
    pub publish: Option<bson::DateTime>,
    #[serde(rename = "draftmode")]
    pub draft_mode: bool,
    pub body: String,
    pub tags: Vec<String>,
    pub views: i64,
}

/// Projection of [`PostDocument`] without the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummaryDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub author: String,
    pub title: String,
    pub created: bson::DateTime,
    pub edited: Option<bson::DateTime>,
    pub publish: Option<bson::DateTime>,
    #[serde(rename = "draftmode")]
    pub draft_mode: bool,
    pub tags: Vec<String>,
    pub views: i64,
}

fn to_bson(date: chrono::DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(date.timestamp_millis())
}

fn from_bson(date: bson::DateTime) -> Result<chrono::DateTime<Utc>, RepoError> {
    chrono::DateTime::from_timestamp_millis(date.timestamp_millis())
        .ok_or_else(|| RepoError::Query(format!("stored date out of range: {date}")))
}

fn parse_id(id: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(id).map_err(|e| RepoError::Query(format!("malformed stored id {id}: {e}")))
}

fn to_views(views: i64) -> u64 {
    u64::try_from(views).unwrap_or(0)
}

impl From<&Post> for PostDocument {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            author: post.author.clone(),
            title: post.title.clone(),
            created: to_bson(post.created),
            edited: post.edited.map(to_bson),
            publish: post.publish.map(to_bson),
            draft_mode: post.draft_mode,
            body: post.body.clone(),
            tags: post.tags.clone(),
            views: i64::try_from(post.views).unwrap_or(i64::MAX),
        }
    }
}

impl TryFrom<PostDocument> for Post {
    type Error = RepoError;

    fn try_from(doc: PostDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&doc.id)?,
            author: doc.author,
            title: doc.title,
            created: from_bson(doc.created)?,
            edited: doc.edited.map(from_bson).transpose()?,
            publish: doc.publish.map(from_bson).transpose()?,
            draft_mode: doc.draft_mode,
            body: doc.body,
            tags: doc.tags,
            views: to_views(doc.views),
        })
    }
}

impl TryFrom<PostSummaryDocument> for PostSummary {
    type Error = RepoError;

    fn try_from(doc: PostSummaryDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(&doc.id)?,
            author: doc.author,
            title: doc.title,
            created: from_bson(doc.created)?,
            edited: doc.edited.map(from_bson).transpose()?,
            publish: doc.publish.map(from_bson).transpose()?,
            draft_mode: doc.draft_mode,
            tags: doc.tags,
            views: to_views(doc.views),
        })
    }
}
