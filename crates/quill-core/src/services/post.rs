//! Post lifecycle: slug allocation, tag association and ownership checks.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPost, Page, Post, PostChanges, PostDetails, PostSummary};
use crate::error::{DomainError, RepoError, UniqueKey};
use crate::ports::{PostRepository, RemovedRows};
use crate::slug::{slugify, with_suffix};

/// Insert attempts before a slug race is reported as a conflict.
pub const MAX_SLUG_ATTEMPTS: u32 = 5;

/// Post manager.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Create a post owned by `author_id`.
    ///
    /// Slugs are allocated optimistically: the first free candidate at or
    /// after `start` is picked, and if the store still rejects it the search
    /// resumes past the rejected suffix.
    pub async fn create(
        &self,
        input: NewPost,
        author_id: Uuid,
    ) -> Result<PostDetails, DomainError> {
        validate_title(&input.title)?;
        let tags = normalize_tags(&input.tags)?;
        let base = slugify(&input.title);

        let mut start = 0;
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let (slug, index) = self.free_slug(&base, start).await?;
            let post = Post::new(author_id, slug.clone(), &input);
            let post_id = post.id;

            match self.posts.insert(post, &tags).await {
                Ok(()) => {
                    tracing::info!(%post_id, %author_id, %slug, tags = tags.len(), "Post created");
                    return self.load(post_id).await;
                }
                Err(RepoError::Duplicate(UniqueKey::PostSlug)) => {
                    tracing::warn!(%slug, attempt, "Slug taken by a concurrent writer, retrying");
                    start = index + 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::Conflict(format!(
            "Could not allocate a unique slug for '{base}'"
        )))
    }

    /// Update a post owned by `author_id`.
    pub async fn update(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        changes: PostChanges,
    ) -> Result<PostDetails, DomainError> {
        self.ensure_owner(post_id, author_id).await?;

        if let Some(title) = &changes.fields.title {
            validate_title(title)?;
        }
        let tags = changes.tags.as_deref().map(normalize_tags).transpose()?;

        self.posts
            .update(post_id, &changes.fields, tags.as_deref())
            .await?;

        tracing::info!(
            %post_id,
            %author_id,
            replaced_tags = tags.is_some(),
            "Post updated"
        );
        self.load(post_id).await
    }

    /// Delete a post owned by `author_id` along with its dependents.
    pub async fn delete(&self, post_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        self.ensure_owner(post_id, author_id).await?;

        let removed = self.posts.delete_cascade(post_id).await?;
        tracing::info!(
            %post_id,
            %author_id,
            post_tags = removed.post_tags,
            likes = removed.likes,
            comments = removed.comments,
            "Post deleted"
        );
        Ok(true)
    }

    pub async fn find_by_id(&self, post_id: Uuid) -> Result<PostDetails, DomainError> {
        self.load(post_id).await
    }

    /// All posts, newest first.
    pub async fn find_all(&self, page: Page) -> Result<Vec<PostDetails>, DomainError> {
        Ok(self.posts.list(page).await?)
    }

    /// Posts written by `user_id`, newest first.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<Vec<PostSummary>, DomainError> {
        Ok(self.posts.list_by_author(user_id, page).await?)
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        Ok(self.posts.count().await?)
    }

    pub async fn count_by_user(&self, user_id: Uuid) -> Result<u64, DomainError> {
        Ok(self.posts.count_by_author(user_id).await?)
    }

    /// Remove child rows left behind by posts deleted without a cascade.
    pub async fn sweep_orphans(&self) -> Result<RemovedRows, DomainError> {
        let removed = self.posts.delete_orphans().await?;
        if removed.total() > 0 {
            tracing::warn!(
                post_tags = removed.post_tags,
                likes = removed.likes,
                comments = removed.comments,
                "Removed orphaned post dependents"
            );
        } else {
            tracing::debug!("No orphaned post dependents found");
        }
        Ok(removed)
    }

    /// First slug candidate at or after `start` that no post uses yet.
    async fn free_slug(&self, base: &str, start: u32) -> Result<(String, u32), DomainError> {
        let mut index = start;
        loop {
            let candidate = with_suffix(base, index);
            if !self.posts.slug_exists(&candidate).await? {
                return Ok((candidate, index));
            }
            index += 1;
        }
    }

    async fn ensure_owner(&self, post_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        match self.posts.find_author_id(post_id).await? {
            Some(author_id) if author_id == user_id => Ok(()),
            _ => {
                tracing::warn!(%post_id, %user_id, "Rejected post mutation by non-owner");
                Err(DomainError::Unauthorized)
            }
        }
    }

    async fn load(&self, post_id: Uuid) -> Result<PostDetails, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Post {post_id} not found")))
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title", "Title must not be empty"));
    }
    Ok(())
}

/// Drop exact duplicates, keeping first occurrence order. Names are not
/// trimmed or case-folded.
fn normalize_tags(names: &[String]) -> Result<Vec<String>, DomainError> {
    let mut tags: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if name.trim().is_empty() {
            return Err(DomainError::validation("tags", "Tag names must not be blank"));
        }
        if !tags.contains(name) {
            tags.push(name.clone());
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags_is_exact() {
        let names = vec![
            "rust".to_string(),
            "Rust".to_string(),
            "rust".to_string(),
            " rust".to_string(),
        ];
        let tags = normalize_tags(&names).unwrap();
        assert_eq!(tags, vec!["rust", "Rust", " rust"]);
    }

    #[test]
    fn test_normalize_tags_rejects_blank() {
        let err = normalize_tags(&["ok".to_string(), "   ".to_string()]).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "tags", .. }));
    }

    #[test]
    fn test_validate_title() {
        assert!(validate_title("A title").is_ok());
        assert!(validate_title("  ").is_err());
    }
}
