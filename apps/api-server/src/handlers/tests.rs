use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use async_trait::async_trait;
use actix_web::{App, test, web};
use serde_json::{Value, json};
use uuid::Uuid;

use quill_core::ports::{StorageError, UploadSigner};
use quill_core::services::UploadPolicy;
use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService, UnconfiguredSigner};

use super::configure_routes;
use crate::state::{AppState, Repositories};

struct FakeSigner;

#[async_trait]
impl UploadSigner for FakeSigner {
    async fn presign_put(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!(
            "https://media.test/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://media.test/{key}")
    }
}

fn state_with(signer: Arc<dyn UploadSigner>) -> AppState {
    AppState::new(
        Repositories::in_memory(),
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "handler-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "quill-test".to_string(),
        })),
        Arc::new(Argon2PasswordService::new()),
        signer,
        UploadPolicy::default(),
    )
}

fn state() -> AppState {
    state_with(Arc::new(FakeSigner))
}

/// Register a user through the service and return `(user_id, bearer header)`.
async fn sign_up(state: &AppState, name: &str) -> (Uuid, String) {
    let email = format!("{}@example.com", name.to_lowercase());
    let session = state
        .accounts
        .register(name, &email, "correct horse battery")
        .await
        .unwrap();
    (session.user.id, format!("Bearer {}", session.access_token))
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_register_then_me() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": "Ada",
            "email": "Ada@Example.com",
            "password": "correct horse battery"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], "ada@example.com");

    let token = body["access_token"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["name"], "Ada");
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let state = state();
    sign_up(&state, "Grace").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "grace@example.com", "password": "not the password"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_create_post_requires_token() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({"title": "Hello", "content": "World"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_same_title_gets_suffixed_slug() {
    let state = state();
    let (_, auth) = sign_up(&state, "Ada").await;
    let app = app!(state);

    let mut slugs = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({"title": "Hello, World!", "content": "Body", "tags": ["rust"]}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        slugs.push(body["slug"].as_str().unwrap().to_string());
    }

    assert_eq!(slugs, vec!["hello-world", "hello-world-1"]);

    let count: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/posts/count").to_request(),
    )
    .await;
    assert_eq!(count["count"], 2);
}

#[actix_web::test]
async fn test_non_owner_cannot_update_and_owner_can_clear_tags() {
    let state = state();
    let (_, owner) = sign_up(&state, "Ada").await;
    let (_, stranger) = sign_up(&state, "Mallory").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", owner.clone()))
        .set_json(json!({"title": "Mine", "content": "Body", "tags": ["a", "b"]}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/posts/{}", created["id"].as_str().unwrap());

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(("Authorization", stranger))
        .set_json(json!({"title": "Stolen"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(("Authorization", owner))
        .set_json(json!({"tags": []}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["title"], "Mine");
    assert_eq!(updated["tags"], json!([]));
}

#[actix_web::test]
async fn test_like_lifecycle() {
    let state = state();
    let (_, author) = sign_up(&state, "Ada").await;
    let (_, reader) = sign_up(&state, "Bob").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", author))
        .set_json(json!({"title": "Likeable", "content": "Body"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let like_uri = format!("/api/posts/{}/like", created["id"].as_str().unwrap());
    let likes_uri = format!("/api/posts/{}/likes", created["id"].as_str().unwrap());

    let like = || {
        test::TestRequest::post()
            .uri(&like_uri)
            .insert_header(("Authorization", reader.clone()))
            .to_request()
    };
    assert_eq!(test::call_service(&app, like()).await.status(), StatusCode::CREATED);
    let res = test::call_service(&app, like()).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["detail"], "You have already liked this post");

    let req = test::TestRequest::get()
        .uri(&likes_uri)
        .insert_header(("Authorization", reader.clone()))
        .to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["count"], 1);
    assert_eq!(status["has_liked"], true);

    let anonymous: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri(&likes_uri).to_request(),
    )
    .await;
    assert!(anonymous.get("has_liked").is_none());

    let unlike = || {
        test::TestRequest::delete()
            .uri(&like_uri)
            .insert_header(("Authorization", reader.clone()))
            .to_request()
    };
    assert_eq!(test::call_service(&app, unlike()).await.status(), StatusCode::OK);
    assert_eq!(
        test::call_service(&app, unlike()).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_delete_post_removes_comments() {
    let state = state();
    let (user_id, auth) = sign_up(&state, "Ada").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"title": "Short lived", "content": "Body"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_uri = format!("/api/posts/{}", created["id"].as_str().unwrap());

    let req = test::TestRequest::post()
        .uri(&format!("{post_uri}/comments"))
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"content": "First!"}))
        .to_request();
    let comment: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(comment["author"]["name"], "Ada");

    let user_posts: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/users/{user_id}/posts"))
            .to_request(),
    )
    .await;
    assert_eq!(user_posts[0]["comment_count"], 1);

    let req = test::TestRequest::delete()
        .uri(&post_uri)
        .insert_header(("Authorization", auth))
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted["success"], true);

    let res = test::call_service(&app, test::TestRequest::get().uri(&post_uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let count: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri(&format!("{post_uri}/comments/count"))
            .to_request(),
    )
    .await;
    assert_eq!(count["count"], 0);
}

#[actix_web::test]
async fn test_upload_url_validation_and_issue() {
    let state = state();
    let (user_id, auth) = sign_up(&state, "Ada").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/uploads/url")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({"filename": "archive.zip", "content_type": "application/zip"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let problem: Value = test::read_body_json(res).await;
    assert_eq!(problem["errors"][0]["field"], "content_type");

    let req = test::TestRequest::post()
        .uri("/api/uploads/url")
        .insert_header(("Authorization", auth))
        .set_json(json!({"filename": "cover.png", "content_type": "image/png", "size": 2048}))
        .to_request();
    let ticket: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ticket["expires_in"], 300);
    let key = ticket["key"].as_str().unwrap();
    assert!(key.starts_with(&format!("uploads/posts/{user_id}/")));
    assert!(key.ends_with(".png"));
}

#[actix_web::test]
async fn test_upload_without_storage_is_server_error() {
    let state = state_with(Arc::new(UnconfiguredSigner));
    let (_, auth) = sign_up(&state, "Ada").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/uploads/url")
        .insert_header(("Authorization", auth))
        .set_json(json!({"filename": "cover.png", "content_type": "image/png"}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_malformed_input_gets_problem_details() {
    let state = state();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let problem: Value = test::read_body_json(res).await;
    assert_eq!(problem["status"], 400);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/posts/not-a-uuid").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health_reports_backend() {
    let state = state();
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/health").to_request(),
    )
    .await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}
