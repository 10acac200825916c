//! Comments on posts.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Comment, CommentView, Page};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository};

#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn create(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: String,
    ) -> Result<CommentView, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation(
                "content",
                "Comment must not be empty",
            ));
        }
        if self.posts.find_author_id(post_id).await?.is_none() {
            return Err(DomainError::NotFound(format!("Post {post_id} not found")));
        }

        let view = self
            .comments
            .insert(Comment::new(post_id, author_id, content))
            .await?;
        tracing::info!(%post_id, %author_id, comment_id = %view.comment.id, "Comment created");
        Ok(view)
    }

    pub async fn find_by_post(
        &self,
        post_id: Uuid,
        page: Page,
    ) -> Result<Vec<CommentView>, DomainError> {
        Ok(self.comments.list_by_post(post_id, page).await?)
    }

    pub async fn count(&self, post_id: Uuid) -> Result<u64, DomainError> {
        Ok(self.comments.count_by_post(post_id).await?)
    }
}
