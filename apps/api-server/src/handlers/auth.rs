//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_shared::dto::{LoginRequest, RegisterRequest};

use super::convert;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state
        .accounts
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok(HttpResponse::Created().json(convert::session(session)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.accounts.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(convert::session(session)))
}

/// GET /api/auth/me
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.accounts.profile(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(convert::user(user)))
}
