//! PostgreSQL post repository.
//!
//! Multi-row writes (create with tags, tag replacement, cascading delete)
//! each run inside a single transaction.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{Author, Page, Post, PostDetails, PostSummary, PostUpdate, Tag};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, RemovedRows};

use super::entity::{comment, like, post, post_tag, tag, user};
use super::errors::map_db_err;

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    pub(crate) db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let matches = post::Entity::find()
            .filter(post::Column::Slug.eq(slug))
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(matches > 0)
    }

    async fn insert(&self, new_post: Post, tag_names: &[String]) -> Result<(), RepoError> {
        let post_id = new_post.id;
        let txn = self.db.begin().await.map_err(map_db_err)?;

        post::ActiveModel::from(new_post)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        link_tags(&txn, post_id, tag_names)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostDetails>, RepoError> {
        let Some(model) = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let mut details = hydrate(&self.db, vec![model]).await.map_err(map_db_err)?;
        Ok(details.pop())
    }

    async fn find_author_id(&self, id: Uuid) -> Result<Option<Uuid>, RepoError> {
        post::Entity::find_by_id(id)
            .select_only()
            .column(post::Column::AuthorId)
            .into_tuple::<Uuid>()
            .one(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn update(
        &self,
        id: Uuid,
        fields: &PostUpdate,
        tag_names: Option<&[String]>,
    ) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = post::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active: post::ActiveModel = existing.into();
        if let Some(title) = &fields.title {
            active.title = Set(title.clone());
        }
        if let Some(content) = &fields.content {
            active.content = Set(content.clone());
        }
        if let Some(thumbnail) = &fields.thumbnail {
            active.thumbnail = Set(thumbnail.clone());
        }
        if let Some(published) = fields.published {
            active.published = Set(published);
        }
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await.map_err(map_db_err)?;

        if let Some(names) = tag_names {
            post_tag::Entity::delete_many()
                .filter(post_tag::Column::PostId.eq(id))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
            link_tags(&txn, id, names).await.map_err(map_db_err)?;
        }

        txn.commit().await.map_err(map_db_err)
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<RemovedRows, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let post_tags = post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?
            .rows_affected;
        let likes = like::Entity::delete_many()
            .filter(like::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?
            .rows_affected;
        let comments = comment::Entity::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?
            .rows_affected;

        let deleted = post::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        if deleted.rows_affected == 0 {
            // Dropping the transaction rolls the child deletes back.
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(map_db_err)?;
        Ok(RemovedRows {
            post_tags,
            likes,
            comments,
        })
    }

    async fn list(&self, page: Page) -> Result<Vec<PostDetails>, RepoError> {
        let models = post::Entity::find()
            .order_by_desc(post::Column::CreatedAt)
            .offset(page.skip)
            .limit(page.take)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        hydrate(&self.db, models).await.map_err(map_db_err)
    }

    async fn list_by_author(
        &self,
        author_id: Uuid,
        page: Page,
    ) -> Result<Vec<PostSummary>, RepoError> {
        let models = post::Entity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .offset(page.skip)
            .limit(page.take)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let comment_counts =
            count_by_post::<_, comment::Entity>(&self.db, comment::Column::PostId, &ids)
                .await
                .map_err(map_db_err)?;
        let like_counts = count_by_post::<_, like::Entity>(&self.db, like::Column::PostId, &ids)
            .await
            .map_err(map_db_err)?;

        Ok(models
            .into_iter()
            .map(|model| {
                let comments = comment_counts.get(&model.id).copied().unwrap_or(0);
                let likes = like_counts.get(&model.id).copied().unwrap_or(0);
                PostSummary::from_post(&Post::from(model), comments, likes)
            })
            .collect())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        post::Entity::find()
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        post::Entity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn delete_orphans(&self) -> Result<RemovedRows, RepoError> {
        let live_posts = Query::select()
            .column(post::Column::Id)
            .from(post::Entity)
            .to_owned();

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let post_tags = post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.not_in_subquery(live_posts.clone()))
            .exec(&txn)
            .await
            .map_err(map_db_err)?
            .rows_affected;
        let likes = like::Entity::delete_many()
            .filter(like::Column::PostId.not_in_subquery(live_posts.clone()))
            .exec(&txn)
            .await
            .map_err(map_db_err)?
            .rows_affected;
        let comments = comment::Entity::delete_many()
            .filter(comment::Column::PostId.not_in_subquery(live_posts))
            .exec(&txn)
            .await
            .map_err(map_db_err)?
            .rows_affected;
        txn.commit().await.map_err(map_db_err)?;

        Ok(RemovedRows {
            post_tags,
            likes,
            comments,
        })
    }
}

/// Resolve-or-create each tag by exact name and link it to the post.
///
/// Concurrent creators of the same tag converge on one row through
/// `ON CONFLICT (name) DO NOTHING`.
async fn link_tags<C>(db: &C, post_id: Uuid, names: &[String]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    if names.is_empty() {
        return Ok(());
    }

    let candidates = names.iter().map(|name| tag::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
    });
    tag::Entity::insert_many(candidates)
        .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    let tags = tag::Entity::find()
        .filter(tag::Column::Name.is_in(names.iter().cloned()))
        .all(db)
        .await?;

    let links = tags.into_iter().map(|t| post_tag::ActiveModel {
        post_id: Set(post_id),
        tag_id: Set(t.id),
    });
    post_tag::Entity::insert_many(links)
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Attach authors, tags and engagement counts to a page of posts.
async fn hydrate<C>(db: &C, models: Vec<post::Model>) -> Result<Vec<PostDetails>, DbErr>
where
    C: ConnectionTrait,
{
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let author_ids: HashSet<Uuid> = models.iter().map(|m| m.author_id).collect();

    let authors: HashMap<Uuid, Author> = user::Entity::find()
        .filter(user::Column::Id.is_in(author_ids))
        .all(db)
        .await?
        .iter()
        .map(|u| (u.id, Author::from(u)))
        .collect();

    let mut tags: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    let links = post_tag::Entity::find()
        .filter(post_tag::Column::PostId.is_in(ids.clone()))
        .find_also_related(tag::Entity)
        .all(db)
        .await?;
    for (link, tag) in links {
        if let Some(tag) = tag {
            tags.entry(link.post_id).or_default().push(tag.into());
        }
    }

    let comment_counts =
        count_by_post::<_, comment::Entity>(db, comment::Column::PostId, &ids).await?;
    let like_counts = count_by_post::<_, like::Entity>(db, like::Column::PostId, &ids).await?;

    Ok(models
        .into_iter()
        .map(|model| {
            let author = authors.get(&model.author_id).cloned().unwrap_or(Author {
                id: model.author_id,
                name: "Unknown author".to_string(),
                avatar: None,
            });
            let mut post_tags = tags.remove(&model.id).unwrap_or_default();
            post_tags.sort_by(|a, b| a.name.cmp(&b.name));
            let comment_count = comment_counts.get(&model.id).copied().unwrap_or(0);
            let like_count = like_counts.get(&model.id).copied().unwrap_or(0);

            PostDetails {
                post: model.into(),
                author,
                tags: post_tags,
                comment_count,
                like_count,
            }
        })
        .collect())
}

/// `SELECT post_id, COUNT(*) ... GROUP BY post_id` for child rows of the given posts.
async fn count_by_post<C, E>(
    db: &C,
    post_column: E::Column,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, u64>, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, i64)> = E::find()
        .select_only()
        .column(post_column)
        .column_as(post_column.count(), "count")
        .filter(post_column.is_in(ids.iter().copied()))
        .group_by(post_column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(post_id, count)| (post_id, count.max(0) as u64))
        .collect())
}
