use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Post entity - a text blog post.
///
/// Timestamps are kept at millisecond precision so a post read back from the
/// document store compares equal to the one that was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author: String,
    pub title: String,
    pub created: DateTime<Utc>,
    pub edited: Option<DateTime<Utc>>,
    /// Scheduled publish time, possibly in the future. `None` means unscheduled.
    pub publish: Option<DateTime<Utc>>,
    #[serde(rename = "draftmode")]
    pub draft_mode: bool,
    pub body: String,
    pub tags: Vec<String>,
    pub views: u64,
}

/// List view of a post - everything except the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub author: String,
    pub title: String,
    pub created: DateTime<Utc>,
    pub edited: Option<DateTime<Utc>>,
    pub publish: Option<DateTime<Utc>>,
    #[serde(rename = "draftmode")]
    pub draft_mode: bool,
    pub tags: Vec<String>,
    pub views: u64,
}

/// User-supplied fields for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub author: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publish: Option<DateTime<Utc>>,
    #[serde(default, rename = "draftmode")]
    pub draft_mode: Option<bool>,
}

/// Partial update of the mutable post fields.
///
/// Title, body, tags and publish are only applied when present. The draft
/// flag is always applied; leaving it out of the payload means `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub publish: Option<DateTime<Utc>>,
    #[serde(default, rename = "draftmode")]
    pub draft_mode: bool,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl Post {
    /// Build a new post from a create payload.
    ///
    /// The id and creation time are generated here; posts start as drafts
    /// unless the payload says otherwise.
    pub fn new(input: NewPost) -> Result<Self, DomainError> {
        if input.title.is_empty() {
            return Err(DomainError::Validation("post title cannot be empty".into()));
        }
        if input.body.is_empty() {
            return Err(DomainError::Validation("post body cannot be empty".into()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            author: input.author,
            title: input.title,
            created: now(),
            edited: None,
            publish: input.publish.map(|p| p.trunc_subsecs(3)),
            draft_mode: input.draft_mode.unwrap_or(true),
            body: input.body,
            tags: input.tags,
            views: 0,
        })
    }

    /// Apply an update in place.
    ///
    /// The whole payload is checked before anything is written, so a
    /// rejected update leaves the post untouched.
    pub fn apply_update(&mut self, update: PostUpdate) -> Result<(), DomainError> {
        update.validate()?;

        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(publish) = update.publish {
            self.publish = Some(publish.trunc_subsecs(3));
        }
        self.draft_mode = update.draft_mode;
        self.edited = Some(now());

        Ok(())
    }

    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            author: self.author.clone(),
            title: self.title.clone(),
            created: self.created,
            edited: self.edited,
            publish: self.publish,
            draft_mode: self.draft_mode,
            tags: self.tags.clone(),
            views: self.views,
        }
    }
}

impl PostUpdate {
    /// Reject attempts to clear title, body or tags.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.body.as_deref().is_some_and(str::is_empty) {
            return Err(DomainError::Validation("cannot update to empty body".into()));
        }
        if self.tags.as_ref().is_some_and(Vec::is_empty) {
            return Err(DomainError::Validation("cannot set tags to empty list".into()));
        }
        if self.title.as_deref().is_some_and(str::is_empty) {
            return Err(DomainError::Validation("cannot set title to empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn new_post() -> NewPost {
        NewPost {
            author: "alice".to_string(),
            title: "Hello".to_string(),
            body: "First post".to_string(),
            tags: vec!["intro".to_string()],
            publish: None,
            draft_mode: None,
        }
    }

    #[test]
    fn test_new_post_defaults() {
        let before = Utc::now() - TimeDelta::seconds(1);
        let post = Post::new(new_post()).unwrap();

        assert!(!post.id.is_nil());
        assert!(post.draft_mode);
        assert_eq!(post.views, 0);
        assert!(post.created >= before);
        assert!(post.edited.is_none());
        assert!(post.publish.is_none());
    }

    #[test]
    fn test_new_post_ids_are_unique() {
        let a = Post::new(new_post()).unwrap();
        let b = Post::new(new_post()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_new_post_honours_explicit_draft_flag() {
        let mut input = new_post();
        input.draft_mode = Some(false);
        assert!(!Post::new(input).unwrap().draft_mode);
    }

    #[test]
    fn test_new_post_rejects_empty_title_and_body() {
        let mut input = new_post();
        input.title.clear();
        assert!(matches!(Post::new(input), Err(DomainError::Validation(_))));

        let mut input = new_post();
        input.body.clear();
        assert!(matches!(Post::new(input), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_apply_update_overwrites_set_fields() {
        let mut post = Post::new(new_post()).unwrap();
        let original = post.clone();

        post.apply_update(PostUpdate {
            title: Some("Renamed".to_string()),
            body: Some("New body".to_string()),
            tags: Some(vec!["a".to_string(), "b".to_string()]),
            publish: None,
            draft_mode: false,
        })
        .unwrap();

        assert_eq!(post.title, "Renamed");
        assert_eq!(post.body, "New body");
        assert_eq!(post.tags, vec!["a".to_string(), "b".to_string()]);
        assert!(!post.draft_mode);
        assert!(post.edited.is_some());

        assert_eq!(post.id, original.id);
        assert_eq!(post.author, original.author);
        assert_eq!(post.created, original.created);
        assert_eq!(post.publish, original.publish);
        assert_eq!(post.views, original.views);
    }

    #[test]
    fn test_apply_update_keeps_publish_when_unset() {
        let publish = (Utc::now() + TimeDelta::days(3)).trunc_subsecs(3);
        let mut input = new_post();
        input.publish = Some(publish);
        let mut post = Post::new(input).unwrap();

        post.apply_update(PostUpdate {
            draft_mode: true,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(post.publish, Some(publish));
        assert_eq!(post.title, "Hello");
        assert_eq!(post.body, "First post");
    }

    #[test]
    fn test_apply_update_sets_publish() {
        let mut post = Post::new(new_post()).unwrap();
        let publish = (Utc::now() + TimeDelta::hours(5)).trunc_subsecs(3);

        post.apply_update(PostUpdate {
            publish: Some(publish),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(post.publish, Some(publish));
    }

    #[test]
    fn test_draft_flag_is_always_overwritten() {
        let mut post = Post::new(new_post()).unwrap();
        assert!(post.draft_mode);

        post.apply_update(PostUpdate::default()).unwrap();
        assert!(!post.draft_mode);
    }

    #[test]
    fn test_rejected_update_leaves_post_unchanged() {
        let updates = [
            PostUpdate {
                body: Some(String::new()),
                title: Some("changed".to_string()),
                ..Default::default()
            },
            PostUpdate {
                title: Some(String::new()),
                body: Some("changed".to_string()),
                ..Default::default()
            },
            PostUpdate {
                tags: Some(Vec::new()),
                body: Some("changed".to_string()),
                ..Default::default()
            },
        ];

        for update in updates {
            let mut post = Post::new(new_post()).unwrap();
            let original = post.clone();

            let result = post.apply_update(update);

            assert!(matches!(result, Err(DomainError::Validation(_))));
            assert_eq!(post, original);
        }
    }

    #[test]
    fn test_summary_omits_body() {
        let post = Post::new(new_post()).unwrap();
        let json = serde_json::to_value(post.summary()).unwrap();

        assert!(json.get("body").is_none());
        assert_eq!(json["title"], "Hello");
        assert_eq!(json["draftmode"], true);
    }

    #[test]
    fn test_update_payload_defaults() {
        let update: PostUpdate = serde_json::from_str(r#"{"title":"x"}"#).unwrap();

        assert_eq!(update.title.as_deref(), Some("x"));
        assert!(update.body.is_none());
        assert!(update.tags.is_none());
        assert!(update.publish.is_none());
        assert!(!update.draft_mode);
    }
}
