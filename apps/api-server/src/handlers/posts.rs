//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{NewPost, Page, PostChanges, PostUpdate};
use quill_shared::dto::{
    CountResponse, CreatePostRequest, PageQuery, SuccessResponse, UpdatePostRequest,
};

use super::convert;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .find_all(Page::new(query.skip, query.take))
        .await?;
    let body: Vec<_> = posts.into_iter().map(convert::post).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/count
pub async fn count(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let count = state.posts.count().await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.find_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(convert::post(post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewPost {
        title: req.title,
        content: req.content,
        thumbnail: req.thumbnail,
        published: req.published,
        tags: req.tags,
    };

    let post = state.posts.create(input, identity.user_id).await?;
    Ok(HttpResponse::Created().json(convert::post(post)))
}

/// PATCH /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let changes = PostChanges {
        fields: PostUpdate {
            title: req.title,
            content: req.content,
            thumbnail: req.thumbnail,
            published: req.published,
        },
        tags: req.tags,
    };

    let post = state
        .posts
        .update(path.into_inner(), identity.user_id, changes)
        .await?;
    Ok(HttpResponse::Ok().json(convert::post(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let success = state
        .posts
        .delete(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(SuccessResponse { success }))
}

/// GET /api/users/{id}/posts
pub async fn list_by_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .posts
        .find_by_user(path.into_inner(), Page::new(query.skip, query.take))
        .await?;
    let body: Vec<_> = posts.into_iter().map(convert::post_summary).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/users/{id}/posts/count
pub async fn count_by_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let count = state.posts.count_by_user(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}
