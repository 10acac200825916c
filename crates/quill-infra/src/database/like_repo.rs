//! PostgreSQL like repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use quill_core::domain::Like;
use quill_core::error::RepoError;
use quill_core::ports::LikeRepository;

use super::entity::like;
use super::errors::map_db_err;

/// PostgreSQL like repository.
///
/// Duplicate likes are rejected by the `idx_likes_user_post` unique index.
pub struct PostgresLikeRepository {
    db: DbConn,
}

impl PostgresLikeRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn insert(&self, new_like: Like) -> Result<(), RepoError> {
        like::ActiveModel::from(new_like)
            .insert(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn delete(&self, post_id: Uuid, user_id: Uuid) -> Result<(), RepoError> {
        let result = like::Entity::delete_many()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn exists(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        let found = like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .filter(like::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(found.is_some())
    }
}
