//! Presigned upload URLs for post thumbnails.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::ports::{StorageError, UploadSigner};

/// Validation rules and lifetime for upload URLs.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_content_types: Vec<String>,
    pub max_file_size_bytes: u64,
    pub expires_in: Duration,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_content_types: ["image/jpeg", "image/png", "image/webp", "image/gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_file_size_bytes: 5 * 1024 * 1024,
            expires_in: Duration::from_secs(300),
        }
    }
}

/// A client's request to upload one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content_type: String,
    pub size: Option<u64>,
}

/// Everything the client needs to upload directly to object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTicket {
    pub upload_url: String,
    pub key: String,
    pub public_url: String,
    pub expires_in: u64,
}

/// Upload URL issuer.
#[derive(Clone)]
pub struct UploadService {
    signer: Arc<dyn UploadSigner>,
    policy: UploadPolicy,
}

impl UploadService {
    pub fn new(signer: Arc<dyn UploadSigner>, policy: UploadPolicy) -> Self {
        Self { signer, policy }
    }

    pub async fn generate_upload_url(
        &self,
        request: &UploadRequest,
        user_id: Option<Uuid>,
    ) -> Result<UploadTicket, DomainError> {
        self.validate(request)?;

        let key = object_key(
            user_id,
            &request.filename,
            Utc::now().date_naive(),
            Uuid::new_v4(),
        );
        let upload_url = self
            .signer
            .presign_put(&key, &request.content_type, self.policy.expires_in)
            .await
            .map_err(|e| match e {
                StorageError::NotConfigured => {
                    DomainError::Persistence("Object storage is not configured".to_string())
                }
                StorageError::Signing(msg) => {
                    tracing::error!(%key, error = %msg, "Failed to presign upload");
                    DomainError::Persistence(msg)
                }
            })?;

        tracing::info!(%key, content_type = %request.content_type, "Upload URL issued");

        Ok(UploadTicket {
            upload_url,
            public_url: self.signer.public_url(&key),
            key,
            expires_in: self.policy.expires_in.as_secs(),
        })
    }

    fn validate(&self, request: &UploadRequest) -> Result<(), DomainError> {
        if request.filename.trim().is_empty() {
            return Err(DomainError::validation("filename", "filename is required"));
        }
        if request.content_type.trim().is_empty() {
            return Err(DomainError::validation(
                "content_type",
                "content_type is required",
            ));
        }
        if !self
            .policy
            .allowed_content_types
            .iter()
            .any(|allowed| allowed == &request.content_type)
        {
            return Err(DomainError::validation(
                "content_type",
                format!("Unsupported file type: {}", request.content_type),
            ));
        }
        match request.size {
            Some(size) if size > self.policy.max_file_size_bytes => Err(DomainError::validation(
                "size",
                format!(
                    "File too large. Max {} bytes",
                    self.policy.max_file_size_bytes
                ),
            )),
            _ => Ok(()),
        }
    }
}

/// `uploads/posts/{user|anon}/{date}/{id}{.ext}`
///
/// The extension keeps its original case and is dropped when it holds
/// anything but ASCII letters and digits.
pub fn object_key(user_id: Option<Uuid>, filename: &str, date: NaiveDate, id: Uuid) -> String {
    let owner = user_id.map_or_else(|| "anon".to_string(), |id| id.to_string());
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    format!("uploads/posts/{owner}/{}/{id}{ext}", date.format("%Y-%m-%d"))
}
