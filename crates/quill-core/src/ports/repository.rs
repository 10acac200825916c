use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Comment, CommentView, Like, Page, Post, PostDetails, PostSummary, PostUpdate, User,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Child rows removed alongside (or after) a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovedRows {
    pub post_tags: u64,
    pub likes: u64,
    pub comments: u64,
}

impl RemovedRows {
    pub fn total(&self) -> u64 {
        self.post_tags + self.likes + self.comments
    }
}

/// Post repository.
///
/// Every mutating method is atomic: implementations either apply all of
/// their writes or none of them.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Whether any post already uses this slug.
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    /// Insert a post and link it to the named tags, creating missing tags.
    ///
    /// Fails with `RepoError::Duplicate(UniqueKey::PostSlug)` when the slug
    /// is already taken.
    async fn insert(&self, post: Post, tag_names: &[String]) -> Result<(), RepoError>;

    /// Load a post with author, tags and counts.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostDetails>, RepoError>;

    /// Author of a post, if the post exists.
    async fn find_author_id(&self, id: Uuid) -> Result<Option<Uuid>, RepoError>;

    /// Update scalar fields and, when `tag_names` is given, replace the tag set.
    async fn update(
        &self,
        id: Uuid,
        fields: &PostUpdate,
        tag_names: Option<&[String]>,
    ) -> Result<(), RepoError>;

    /// Delete a post together with its tag links, likes and comments.
    async fn delete_cascade(&self, id: Uuid) -> Result<RemovedRows, RepoError>;

    /// All posts, newest first.
    async fn list(&self, page: Page) -> Result<Vec<PostDetails>, RepoError>;

    /// Posts of one author, newest first.
    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: Page,
    ) -> Result<Vec<PostSummary>, RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;

    /// Remove tag links, likes and comments that reference missing posts.
    async fn delete_orphans(&self) -> Result<RemovedRows, RepoError>;
}

/// Like repository.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Fails with `RepoError::Duplicate(UniqueKey::Like)` on a second like.
    async fn insert(&self, like: Like) -> Result<(), RepoError>;

    /// Fails with `RepoError::NotFound` when no such like exists.
    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;

    async fn exists(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: Comment) -> Result<CommentView, RepoError>;

    /// Comments of a post, newest first.
    async fn list_by_post(&self, post_id: Uuid, page: Page)
    -> Result<Vec<CommentView>, RepoError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
