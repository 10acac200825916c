//! In-memory store - used when no database is configured, and in tests.
//!
//! Enforces the same unique keys as the PostgreSQL schema (post slug, tag
//! name, user email, one like per user and post). Every operation holds the
//! write lock for its whole duration, so multi-row writes are atomic.
//! Foreign keys are not enforced; dangling child rows are left for the
//! orphan sweep.
//! Note: Data is lost on process restart.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{
    Author, Comment, CommentView, Like, Page, Post, PostDetails, PostSummary, PostUpdate, Tag,
    User,
};
use quill_core::error::{RepoError, UniqueKey};
use quill_core::ports::{
    BaseRepository, CommentRepository, LikeRepository, PostRepository, RemovedRows,
    UserRepository,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    // Insertion order doubles as the tie-breaker for equal timestamps.
    posts: Vec<Post>,
    tags: HashMap<String, Tag>,
    post_tags: HashSet<(Uuid, Uuid)>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
}

impl State {
    fn post(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn author(&self, id: Uuid) -> Author {
        self.users
            .get(&id)
            .map(Author::from)
            .unwrap_or(Author {
                id,
                name: "Unknown author".to_string(),
                avatar: None,
            })
    }

    fn comment_count(&self, post_id: Uuid) -> u64 {
        self.comments.iter().filter(|c| c.post_id == post_id).count() as u64
    }

    fn like_count(&self, post_id: Uuid) -> u64 {
        self.likes.iter().filter(|l| l.post_id == post_id).count() as u64
    }

    fn details(&self, post: &Post) -> PostDetails {
        let tag_ids: HashSet<Uuid> = self
            .post_tags
            .iter()
            .filter(|(post_id, _)| *post_id == post.id)
            .map(|(_, tag_id)| *tag_id)
            .collect();
        let mut tags: Vec<Tag> = self
            .tags
            .values()
            .filter(|t| tag_ids.contains(&t.id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        PostDetails {
            post: post.clone(),
            author: self.author(post.author_id),
            tags,
            comment_count: self.comment_count(post.id),
            like_count: self.like_count(post.id),
        }
    }

    /// Posts newest first; later insertions win ties.
    fn newest_first<'a>(&'a self, filter: impl Fn(&Post) -> bool) -> Vec<&'a Post> {
        let mut posts: Vec<&Post> = self.posts.iter().rev().filter(|p| filter(p)).collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    fn link_tags(&mut self, post_id: Uuid, names: &[String]) {
        for name in names {
            let tag_id = self
                .tags
                .entry(name.clone())
                .or_insert_with(|| Tag::new(name.clone()))
                .id;
            self.post_tags.insert((post_id, tag_id));
        }
    }

    fn unlink_tags(&mut self, post_id: Uuid) -> u64 {
        let before = self.post_tags.len();
        self.post_tags.retain(|(p, _)| *p != post_id);
        (before - self.post_tags.len()) as u64
    }
}

fn paginate<T>(items: Vec<T>, page: Page) -> impl Iterator<Item = T> {
    items
        .into_iter()
        .skip(page.skip as usize)
        .take(page.take as usize)
}

/// In-memory implementation of every repository port.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(RepoError::Duplicate(UniqueKey::UserEmail));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.state
            .write()
            .await
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        Ok(self.state.read().await.posts.iter().any(|p| p.slug == slug))
    }

    async fn insert(&self, post: Post, tag_names: &[String]) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.posts.iter().any(|p| p.slug == post.slug) {
            return Err(RepoError::Duplicate(UniqueKey::PostSlug));
        }

        let post_id = post.id;
        state.posts.push(post);
        state.link_tags(post_id, tag_names);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostDetails>, RepoError> {
        let state = self.state.read().await;
        Ok(state.post(id).map(|p| state.details(p)))
    }

    async fn find_author_id(&self, id: Uuid) -> Result<Option<Uuid>, RepoError> {
        Ok(self.state.read().await.post(id).map(|p| p.author_id))
    }

    async fn update(
        &self,
        id: Uuid,
        fields: &PostUpdate,
        tag_names: Option<&[String]>,
    ) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;
        fields.apply(post);
        post.updated_at = Utc::now();

        if let Some(names) = tag_names {
            state.unlink_tags(id);
            state.link_tags(id, names);
        }
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<RemovedRows, RepoError> {
        let mut state = self.state.write().await;
        let Some(index) = state.posts.iter().position(|p| p.id == id) else {
            return Err(RepoError::NotFound);
        };

        let post_tags = state.unlink_tags(id);
        let likes_before = state.likes.len();
        state.likes.retain(|l| l.post_id != id);
        let comments_before = state.comments.len();
        state.comments.retain(|c| c.post_id != id);
        state.posts.remove(index);

        Ok(RemovedRows {
            post_tags,
            likes: (likes_before - state.likes.len()) as u64,
            comments: (comments_before - state.comments.len()) as u64,
        })
    }

    async fn list(&self, page: Page) -> Result<Vec<PostDetails>, RepoError> {
        let state = self.state.read().await;
        Ok(paginate(state.newest_first(|_| true), page)
            .map(|p| state.details(p))
            .collect())
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: Page,
    ) -> Result<Vec<PostSummary>, RepoError> {
        let state = self.state.read().await;
        Ok(
            paginate(state.newest_first(|p| p.author_id == author_id), page)
                .map(|p| {
                    PostSummary::from_post(p, state.comment_count(p.id), state.like_count(p.id))
                })
                .collect(),
        )
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.state.read().await.posts.len() as u64)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .count() as u64)
    }

    async fn delete_orphans(&self) -> Result<RemovedRows, RepoError> {
        let mut state = self.state.write().await;
        let live: HashSet<Uuid> = state.posts.iter().map(|p| p.id).collect();

        let (tags_before, likes_before, comments_before) = (
            state.post_tags.len(),
            state.likes.len(),
            state.comments.len(),
        );
        state.post_tags.retain(|(post_id, _)| live.contains(post_id));
        state.likes.retain(|l| live.contains(&l.post_id));
        state.comments.retain(|c| live.contains(&c.post_id));

        Ok(RemovedRows {
            post_tags: (tags_before - state.post_tags.len()) as u64,
            likes: (likes_before - state.likes.len()) as u64,
            comments: (comments_before - state.comments.len()) as u64,
        })
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn insert(&self, like: Like) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state
            .likes
            .iter()
            .any(|l| l.user_id == like.user_id && l.post_id == like.post_id)
        {
            return Err(RepoError::Duplicate(UniqueKey::Like));
        }
        state.likes.push(like);
        Ok(())
    }

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let before = state.likes.len();
        state
            .likes
            .retain(|l| !(l.user_id == user_id && l.post_id == post_id));
        if state.likes.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        Ok(self.state.read().await.like_count(post_id))
    }

    async fn exists(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .likes
            .iter()
            .any(|l| l.user_id == user_id && l.post_id == post_id))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert(&self, comment: Comment) -> Result<CommentView, RepoError> {
        let mut state = self.state.write().await;
        let author = state.author(comment.author_id);
        state.comments.push(comment.clone());
        Ok(CommentView { comment, author })
    }

    async fn list_by_post(
        &self,
        post_id: Uuid,
        page: Page,
    ) -> Result<Vec<CommentView>, RepoError> {
        let state = self.state.read().await;
        let mut comments: Vec<&Comment> = state
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paginate(comments, page)
            .map(|c| CommentView {
                comment: c.clone(),
                author: state.author(c.author_id),
            })
            .collect())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        Ok(self.state.read().await.comment_count(post_id))
    }
}
