//! Upload URL handler.

use actix_web::{HttpResponse, web};

use quill_core::services::UploadRequest;
use quill_shared::dto::UploadUrlRequest;

use super::convert;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/uploads/url
pub async fn create_upload_url(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UploadUrlRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let request = UploadRequest {
        filename: req.filename,
        content_type: req.content_type,
        size: req.size,
    };

    let ticket = state
        .uploads
        .generate_upload_url(&request, Some(identity.user_id))
        .await?;
    Ok(HttpResponse::Ok().json(convert::upload(ticket)))
}
