//! Object storage signers.

use std::time::Duration;

use async_trait::async_trait;
use quill_core::ports::{StorageError, UploadSigner};

#[cfg(feature = "storage")]
mod s3;

#[cfg(feature = "storage")]
pub use s3::{S3Config, S3Presigner};

/// Signer used when no bucket credentials are configured.
///
/// Every presign request fails with [`StorageError::NotConfigured`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredSigner;

#[async_trait]
impl UploadSigner for UnconfiguredSigner {
    async fn presign_put(
        &self,
        _key: &str,
        _content_type: &str,
        _expires_in: Duration,
    ) -> Result<String, StorageError> {
        Err(StorageError::NotConfigured)
    }

    fn public_url(&self, key: &str) -> String {
        format!("/{key}")
    }
}
