//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Page;
use quill_shared::dto::{CountResponse, CreateCommentRequest, PageQuery};

use super::convert;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
pub async fn list(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let comments = state
        .comments
        .find_by_post(path.into_inner(), Page::new(query.skip, query.take))
        .await?;
    let body: Vec<_> = comments.into_iter().map(convert::comment).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id}/comments/count
pub async fn count(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let count = state.comments.count(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// POST /api/posts/{id}/comments
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let comment = state
        .comments
        .create(path.into_inner(), identity.user_id, body.into_inner().content)
        .await?;
    Ok(HttpResponse::Created().json(convert::comment(comment)))
}
