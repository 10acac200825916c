//! Likes on posts.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Like;
use crate::error::{DomainError, RepoError, UniqueKey};
use crate::ports::{LikeRepository, PostRepository};

/// Like manager.
#[derive(Clone)]
pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    posts: Arc<dyn PostRepository>,
}

impl LikeService {
    pub fn new(likes: Arc<dyn LikeRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { likes, posts }
    }

    pub async fn like_post(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        if self.posts.find_author_id(post_id).await?.is_none() {
            return Err(DomainError::NotFound(format!("Post {post_id} not found")));
        }

        match self.likes.insert(Like::new(post_id, user_id)).await {
            Ok(()) => {
                tracing::debug!(%post_id, %user_id, "Post liked");
                Ok(true)
            }
            Err(RepoError::Duplicate(UniqueKey::Like)) => Err(DomainError::Conflict(
                "You have already liked this post".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn unlike_post(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, DomainError> {
        match self.likes.delete(post_id, user_id).await {
            Ok(()) => {
                tracing::debug!(%post_id, %user_id, "Post unliked");
                Ok(true)
            }
            Err(RepoError::NotFound) => Err(DomainError::NotFound("Like not found".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn count(&self, post_id: Uuid) -> Result<u64, DomainError> {
        Ok(self.likes.count_by_post(post_id).await?)
    }

    pub async fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, DomainError> {
        Ok(self.likes.exists(user_id, post_id).await?)
    }
}
