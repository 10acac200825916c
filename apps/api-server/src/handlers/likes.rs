//! Like handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::{LikeStatusResponse, SuccessResponse};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts/{id}/like
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let success = state
        .likes
        .like_post(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::Created().json(SuccessResponse { success }))
}

/// DELETE /api/posts/{id}/like
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let success = state
        .likes
        .unlike_post(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(SuccessResponse { success }))
}

/// GET /api/posts/{id}/likes
pub async fn status(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let count = state.likes.count(post_id).await?;
    let has_liked = match identity.0 {
        Some(identity) => Some(state.likes.has_liked(identity.user_id, post_id).await?),
        None => None,
    };

    Ok(HttpResponse::Ok().json(LikeStatusResponse {
        post_id,
        count,
        has_liked,
    }))
}
