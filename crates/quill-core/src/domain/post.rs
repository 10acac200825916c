use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, Tag};

/// Post entity - represents a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post from validated input and a resolved slug.
    pub fn new(author_id: Uuid, slug: String, input: &NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: input.title.clone(),
            slug,
            content: input.content.clone(),
            thumbnail: input.thumbnail.clone(),
            published: input.published,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub tags: Vec<String>,
}

/// Scalar fields of a post that may be changed after creation.
///
/// The author is deliberately absent. `thumbnail: Some(None)` clears the
/// thumbnail, `None` leaves it as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<Option<String>>,
    pub published: Option<bool>,
}

impl PostUpdate {
    /// Apply the supplied fields to a post in place.
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(thumbnail) = &self.thumbnail {
            post.thumbnail = thumbnail.clone();
        }
        if let Some(published) = self.published {
            post.published = published;
        }
    }
}

/// Input for updating a post.
///
/// `tags: Some(..)` replaces the whole tag set (an empty list clears it);
/// `None` leaves the associations untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostChanges {
    #[serde(flatten)]
    pub fields: PostUpdate,
    pub tags: Option<Vec<String>>,
}

/// A post hydrated with its author, tags and engagement counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetails {
    pub post: Post,
    pub author: Author,
    pub tags: Vec<Tag>,
    pub comment_count: u64,
    pub like_count: u64,
}

/// Reduced projection used for per-author listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub comment_count: u64,
    pub like_count: u64,
}

impl PostSummary {
    pub fn from_post(post: &Post, comment_count: u64, like_count: u64) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            content: post.content.clone(),
            thumbnail: post.thumbnail.clone(),
            published: post.published,
            created_at: post.created_at,
            comment_count,
            like_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with_thumbnail() -> Post {
        let input = NewPost {
            title: "Cover".to_string(),
            content: "Body".to_string(),
            thumbnail: Some("https://cdn.test/cover.png".to_string()),
            ..NewPost::default()
        };
        Post::new(Uuid::new_v4(), "cover".to_string(), &input)
    }

    #[test]
    fn test_apply_keeps_thumbnail_when_absent() {
        let mut post = post_with_thumbnail();
        PostUpdate {
            title: Some("Renamed".to_string()),
            ..PostUpdate::default()
        }
        .apply(&mut post);

        assert_eq!(post.title, "Renamed");
        assert_eq!(post.thumbnail.as_deref(), Some("https://cdn.test/cover.png"));
    }

    #[test]
    fn test_apply_clears_thumbnail() {
        let mut post = post_with_thumbnail();
        PostUpdate {
            thumbnail: Some(None),
            ..PostUpdate::default()
        }
        .apply(&mut post);

        assert!(post.thumbnail.is_none());
    }
}
