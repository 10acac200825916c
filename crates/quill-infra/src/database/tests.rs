use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use quill_core::domain::{NewPost, Page, Post, PostUpdate, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, LikeRepository, PostRepository, RemovedRows, UserRepository};

use crate::database::entity::{comment, like, post, post_tag, tag, user};
use crate::database::{
    PostgresLikeRepository, PostgresPostRepository, PostgresUserRepository,
};

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Into::<Value>::into(n))])
}

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn tag_model(name: &str) -> tag::Model {
    tag::Model {
        id: Uuid::new_v4(),
        name: name.to_owned(),
    }
}

fn no_rows() -> Vec<BTreeMap<&'static str, Value>> {
    Vec::new()
}

/// SQL of every recorded statement, grouped by transaction.
fn sql_log(db: DatabaseConnection) -> Vec<Vec<String>> {
    db.into_transaction_log()
        .iter()
        .map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()).collect())
        .collect()
}

fn position(statements: &[String], prefix: &str) -> usize {
    statements
        .iter()
        .position(|sql| sql.starts_with(prefix))
        .unwrap_or_else(|| panic!("no statement starting with {prefix}: {statements:#?}"))
}

fn user_model(id: Uuid) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        password_hash: "hash".to_owned(),
        bio: None,
        avatar: Some("https://cdn.test/ada.png".to_owned()),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn post_model(id: Uuid, author_id: Uuid) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id,
        title: "Test Post".to_owned(),
        slug: "test-post".to_owned(),
        content: "Content".to_owned(),
        thumbnail: None,
        published: true,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id_attaches_author() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id)]])
        .append_query_results([vec![user_model(author_id)]])
        .append_query_results([Vec::<post_tag::Model>::new()])
        .append_query_results([Vec::<comment::Model>::new()])
        .append_query_results([Vec::<like::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let details = repo.find_by_id(post_id).await.unwrap().unwrap();

    assert_eq!(details.post.id, post_id);
    assert_eq!(details.post.slug, "test-post");
    assert_eq!(details.author.id, author_id);
    assert_eq!(details.author.name, "Ada");
    assert!(details.tags.is_empty());
    assert_eq!(details.comment_count, 0);
    assert_eq!(details.like_count, 0);
}

#[tokio::test]
async fn test_find_missing_post_returns_none() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_slug_exists() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(1)]])
        .append_query_results([vec![count_row(0)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.slug_exists("hello-world").await.unwrap());
    assert!(!repo.slug_exists("hello-world-1").await.unwrap());
}

#[tokio::test]
async fn test_find_author_id() {
    let author_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([(
            "author_id",
            Into::<Value>::into(author_id),
        )])]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert_eq!(
        repo.find_author_id(Uuid::new_v4()).await.unwrap(),
        Some(author_id)
    );
}

#[tokio::test]
async fn test_delete_cascade_reports_removed_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(2), exec(1), exec(3), exec(1)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let removed = repo.delete_cascade(Uuid::new_v4()).await.unwrap();

    assert_eq!(
        removed,
        RemovedRows {
            post_tags: 2,
            likes: 1,
            comments: 3,
        }
    );
}

#[tokio::test]
async fn test_delete_cascade_of_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0), exec(0), exec(0), exec(0)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.delete_cascade(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_unlike_without_like_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0)])
        .into_connection();

    let repo = PostgresLikeRepository::new(db);
    let result = repo.delete(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_like_count_and_exists() {
    let post_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count_row(3)]])
        .append_query_results([vec![like::Model {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            created_at: Utc::now().into(),
        }]])
        .into_connection();

    let repo = PostgresLikeRepository::new(db);
    assert_eq!(repo.count_by_post(post_id).await.unwrap(), 3);
    assert!(repo.exists(user_id, post_id).await.unwrap());
}

#[tokio::test]
async fn test_find_user_by_email() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(user_id)]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let found: Option<User> = repo.find_by_email("ada@example.com").await.unwrap();

    let found = found.unwrap();
    assert_eq!(found.id, user_id);
    assert_eq!(found.name, "Ada");
}

#[tokio::test]
async fn test_find_user_by_id_via_base_repository() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(user_id)]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let found: Option<User> = repo.find_by_id(user_id).await.unwrap();

    assert_eq!(found.map(|u| u.email), Some("ada@example.com".to_owned()));
}

#[tokio::test]
async fn test_save_inserts_when_no_row_was_updated() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .append_query_results([vec![user_model(user_id)]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let saved = repo.save(User::from(user_model(user_id))).await.unwrap();

    assert_eq!(saved.id, user_id);
    assert_eq!(saved.email, "ada@example.com");
}

#[tokio::test]
async fn test_save_updates_existing_row() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(user_id)]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let saved = repo.save(User::from(user_model(user_id))).await.unwrap();

    assert_eq!(saved.name, "Ada");
}

#[tokio::test]
async fn test_insert_post_links_tags_in_one_transaction() {
    let author_id = Uuid::new_v4();
    let input = NewPost {
        title: "Hello World".to_owned(),
        content: "Content".to_owned(),
        ..NewPost::default()
    };
    let new_post = Post::new(author_id, "hello-world".to_owned(), &input);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(new_post.id, author_id)]])
        .append_query_results([vec![tag_model("rust"), tag_model("web")]])
        .append_exec_results([exec(2), exec(2)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    repo.insert(new_post, &["rust".to_owned(), "web".to_owned()])
        .await
        .unwrap();

    let log = sql_log(repo.db);
    assert_eq!(log.len(), 1);
    let statements = &log[0];

    let post_insert = position(statements, r#"INSERT INTO "posts""#);
    let tag_insert = position(statements, r#"INSERT INTO "tags""#);
    let tag_lookup = position(statements, r#"SELECT "tags"."id""#);
    let link_insert = position(statements, r#"INSERT INTO "post_tags""#);
    assert!(post_insert < tag_insert);
    assert!(tag_insert < tag_lookup);
    assert!(tag_lookup < link_insert);
    assert!(statements[tag_insert].contains(r#"ON CONFLICT ("name") DO NOTHING"#));
}

#[tokio::test]
async fn test_insert_post_without_tags_skips_tag_tables() {
    let author_id = Uuid::new_v4();
    let new_post = Post::new(author_id, "untagged".to_owned(), &NewPost::default());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(new_post.id, author_id)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    repo.insert(new_post, &[]).await.unwrap();

    let log = sql_log(repo.db);
    assert_eq!(log.len(), 1);
    assert!(!log[0].iter().any(|sql| sql.contains(r#""tags""#)));
    assert!(!log[0].iter().any(|sql| sql.contains(r#""post_tags""#)));
}

#[tokio::test]
async fn test_update_with_tags_replaces_links_atomically() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![post_model(post_id, author_id)],
            vec![post_model(post_id, author_id)],
        ])
        .append_query_results([vec![tag_model("rust")]])
        .append_exec_results([exec(2), exec(1), exec(1)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let fields = PostUpdate {
        title: Some("Renamed".to_owned()),
        ..PostUpdate::default()
    };
    let tags = vec!["rust".to_owned()];
    repo.update(post_id, &fields, Some(tags.as_slice()))
        .await
        .unwrap();

    let log = sql_log(repo.db);
    assert_eq!(log.len(), 1);
    let statements = &log[0];

    let post_update = position(statements, r#"UPDATE "posts""#);
    let unlink = position(statements, r#"DELETE FROM "post_tags""#);
    let tag_insert = position(statements, r#"INSERT INTO "tags""#);
    let relink = position(statements, r#"INSERT INTO "post_tags""#);
    assert!(post_update < unlink);
    assert!(unlink < tag_insert);
    assert!(tag_insert < relink);
}

#[tokio::test]
async fn test_update_with_empty_tags_only_unlinks() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![post_model(post_id, author_id)],
            vec![post_model(post_id, author_id)],
        ])
        .append_exec_results([exec(3)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let no_tags: Vec<String> = Vec::new();
    repo.update(post_id, &PostUpdate::default(), Some(no_tags.as_slice()))
        .await
        .unwrap();

    let log = sql_log(repo.db);
    assert_eq!(log.len(), 1);
    let statements = &log[0];

    position(statements, r#"DELETE FROM "post_tags""#);
    assert!(!statements.iter().any(|sql| sql.starts_with("INSERT")));
}

#[tokio::test]
async fn test_update_without_tags_leaves_links_alone() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([
            vec![post_model(post_id, author_id)],
            vec![post_model(post_id, author_id)],
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let fields = PostUpdate {
        thumbnail: Some(None),
        ..PostUpdate::default()
    };
    repo.update(post_id, &fields, None).await.unwrap();

    let log = sql_log(repo.db);
    assert_eq!(log.len(), 1);
    position(&log[0], r#"UPDATE "posts""#);
    assert!(!log[0].iter().any(|sql| sql.contains(r#""post_tags""#)));
}

#[tokio::test]
async fn test_update_of_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.update(Uuid::new_v4(), &PostUpdate::default(), None).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_list_keeps_order_and_falls_back_for_missing_author() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let known_author = Uuid::new_v4();
    let gone_author = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            post_model(first, known_author),
            post_model(second, gone_author),
        ]])
        .append_query_results([vec![user_model(known_author)]])
        .append_query_results([no_rows(), no_rows(), no_rows()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let details = repo.list(Page::new(Some(12), Some(2))).await.unwrap();

    let ids: Vec<Uuid> = details.iter().map(|d| d.post.id).collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(details[0].author.name, "Ada");
    assert_eq!(details[1].author.name, "Unknown author");
    assert_eq!(details[1].author.id, gone_author);

    let log = sql_log(repo.db);
    let listing = &log[0][0];
    assert!(listing.contains(r#"ORDER BY "posts"."created_at" DESC"#));
    assert!(listing.contains("LIMIT"));
    assert!(listing.contains("OFFSET"));
}

#[tokio::test]
async fn test_list_by_author_filters_and_summarises() {
    let author_id = Uuid::new_v4();
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id)]])
        .append_query_results([no_rows(), no_rows()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let summaries = repo.list_by_author(author_id, Page::default()).await.unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, post_id);
    assert_eq!(summaries[0].comment_count, 0);
    assert_eq!(summaries[0].like_count, 0);

    let log = sql_log(repo.db);
    assert!(log[0][0].contains(r#""posts"."author_id" = $1"#));
}

#[tokio::test]
async fn test_delete_orphans_runs_in_one_transaction() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1), exec(2), exec(0)])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let removed = repo.delete_orphans().await.unwrap();

    assert_eq!(
        removed,
        RemovedRows {
            post_tags: 1,
            likes: 2,
            comments: 0,
        }
    );

    let log = sql_log(repo.db);
    assert_eq!(log.len(), 1);
    let deletes: Vec<&String> = log[0]
        .iter()
        .filter(|sql| sql.starts_with("DELETE"))
        .collect();
    assert_eq!(deletes.len(), 3);
    assert!(
        deletes
            .iter()
            .all(|sql| sql.contains(r#"NOT IN (SELECT "id" FROM "posts")"#))
    );
}
