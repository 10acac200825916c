//! Object storage port.

use std::time::Duration;

use async_trait::async_trait;

/// Issues time-limited upload authorizations for object keys.
///
/// Implementations never hold the file bytes; they only sign requests.
#[async_trait]
pub trait UploadSigner: Send + Sync {
    /// Presigned `PUT` URL for `key`, bound to `content_type`.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Stable URL the object will be readable at once uploaded.
    fn public_url(&self, key: &str) -> String;
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object storage is not configured")]
    NotConfigured,

    #[error("Signing failed: {0}")]
    Signing(String),
}
