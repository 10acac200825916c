//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// --- Accounts ---

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// A user's own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response containing an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

// --- Posts ---

/// Public projection of a post or comment author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
}

/// A post with its author, tags and engagement counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorResponse,
    pub tags: Vec<TagResponse>,
    pub comment_count: u64,
    pub like_count: u64,
}

/// Per-author listing entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummaryResponse {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; absent fields are left unchanged.
///
/// `tags` replaces the whole set when present, `[]` clears it.
/// `"thumbnail": null` removes the thumbnail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<Option<String>>,
    pub published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

// --- Engagement ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Like count, plus whether the caller liked the post when authenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeStatusResponse {
    pub post_id: Uuid,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_liked: Option<bool>,
}

/// Outcome of a mutation that only reports success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// `?skip=&take=` query string.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

// --- Uploads ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlRequest {
    pub filename: String,
    pub content_type: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Presigned `PUT` target plus the object's eventual public location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub key: String,
    pub public_url: String,
    pub expires_in: u64,
}

/// Wraps any present value, `null` included, in `Some`; a missing field
/// falls back to `None` through `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_defaults() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"Hello","content":"World"}"#).unwrap();
        assert!(!req.published);
        assert!(req.tags.is_empty());
        assert!(req.thumbnail.is_none());
    }

    #[test]
    fn test_update_distinguishes_absent_and_empty_tags() {
        let absent: UpdatePostRequest = serde_json::from_str(r#"{"title":"New"}"#).unwrap();
        let cleared: UpdatePostRequest = serde_json::from_str(r#"{"tags":[]}"#).unwrap();

        assert!(absent.tags.is_none());
        assert_eq!(cleared.tags, Some(vec![]));
    }

    #[test]
    fn test_update_distinguishes_absent_and_null_thumbnail() {
        let absent: UpdatePostRequest = serde_json::from_str(r#"{"title":"New"}"#).unwrap();
        let cleared: UpdatePostRequest =
            serde_json::from_str(r#"{"thumbnail":null}"#).unwrap();
        let set: UpdatePostRequest =
            serde_json::from_str(r#"{"thumbnail":"https://cdn.test/a.png"}"#).unwrap();

        assert_eq!(absent.thumbnail, None);
        assert_eq!(cleared.thumbnail, Some(None));
        assert_eq!(set.thumbnail, Some(Some("https://cdn.test/a.png".to_string())));
    }
}
