//! PostgreSQL comment repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use quill_core::domain::{Author, Comment, CommentView, Page};
use quill_core::error::RepoError;
use quill_core::ports::CommentRepository;

use super::entity::{comment, user};
use super::errors::map_db_err;

/// PostgreSQL comment repository.
pub struct PostgresCommentRepository {
    db: DbConn,
}

impl PostgresCommentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn author_or_placeholder(author_id: Uuid, model: Option<&user::Model>) -> Author {
    model.map(Author::from).unwrap_or(Author {
        id: author_id,
        name: "Unknown author".to_string(),
        avatar: None,
    })
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn insert(&self, new_comment: Comment) -> Result<CommentView, RepoError> {
        let saved: Comment = comment::ActiveModel::from(new_comment)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?
            .into();

        let author = user::Entity::find_by_id(saved.author_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(CommentView {
            author: author_or_placeholder(saved.author_id, author.as_ref()),
            comment: saved,
        })
    }

    async fn list_by_post(
        &self,
        post_id: Uuid,
        page: Page,
    ) -> Result<Vec<CommentView>, RepoError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_desc(comment::Column::CreatedAt)
            .offset(page.skip)
            .limit(page.take)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(model, author)| {
                let author = author_or_placeholder(model.author_id, author.as_ref());
                CommentView {
                    comment: model.into(),
                    author,
                }
            })
            .collect())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}
