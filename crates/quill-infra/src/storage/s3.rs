//! S3 presigned `PUT` URLs backed by the opendal S3 service.
//!
//! Works against AWS (virtual-hosted buckets) and S3-compatible servers
//! such as MinIO (path-style, via `S3_ENDPOINT`).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use opendal::Operator;
use opendal::layers::TracingLayer;
use opendal::services::S3;

use quill_core::ports::{StorageError, UploadSigner};

/// Longest lifetime S3 accepts for a presigned request.
const MAX_EXPIRES: Duration = Duration::from_secs(7 * 24 * 3600);

/// Bucket location and credentials.
#[derive(Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// Custom endpoint such as `http://localhost:9000`; switches to path-style.
    pub endpoint: Option<String>,
    /// Base for public object URLs, e.g. a CDN origin.
    pub public_base_url: Option<String>,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .field("public_base_url", &self.public_base_url)
            .finish()
    }
}

impl S3Config {
    /// Read the bucket settings from the environment.
    ///
    /// Returns `None` unless `S3_BUCKET`, `AWS_ACCESS_KEY_ID` and
    /// `AWS_SECRET_ACCESS_KEY` are all set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Some(Self {
            bucket: var("S3_BUCKET")?,
            region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            access_key_id: var("AWS_ACCESS_KEY_ID")?,
            secret_access_key: var("AWS_SECRET_ACCESS_KEY")?,
            session_token: var("AWS_SESSION_TOKEN"),
            endpoint: var("S3_ENDPOINT").map(|e| e.trim_end_matches('/').to_string()),
            public_base_url: var("S3_PUBLIC_BASE_URL").map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    /// Origin objects are served from when no public base URL is set.
    fn object_origin(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{endpoint}/{}", self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

/// Upload signer over an opendal S3 operator.
pub struct S3Presigner {
    operator: Operator,
    public_origin: String,
}

impl S3Presigner {
    /// Build the operator from static credentials only; no environment,
    /// profile or instance-metadata lookups happen.
    pub fn new(config: S3Config) -> Result<Self, StorageError> {
        let mut builder = S3::default()
            .bucket(&config.bucket)
            .region(&config.region)
            .access_key_id(&config.access_key_id)
            .secret_access_key(&config.secret_access_key)
            .disable_config_load()
            .disable_ec2_metadata();

        builder = match &config.endpoint {
            Some(endpoint) => builder.endpoint(endpoint),
            None => builder
                .endpoint(&format!("https://s3.{}.amazonaws.com", config.region))
                .enable_virtual_host_style(),
        };
        if let Some(token) = &config.session_token {
            builder = builder.session_token(token);
        }

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::Signing(e.to_string()))?
            .layer(TracingLayer)
            .finish();

        let public_origin = config
            .public_base_url
            .clone()
            .unwrap_or_else(|| config.object_origin());

        Ok(Self {
            operator,
            public_origin,
        })
    }
}

#[async_trait]
impl UploadSigner for S3Presigner {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let expires = expires_in.clamp(Duration::from_secs(1), MAX_EXPIRES);

        let request = self
            .operator
            .presign_write_with(key, expires)
            .content_type(content_type)
            .await
            .map_err(|e| StorageError::Signing(e.to_string()))?;

        Ok(request.uri().to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "uploads/posts/anon/2025-03-09/cover.png";

    fn config() -> S3Config {
        S3Config {
            bucket: "quill-media".to_string(),
            region: "eu-west-1".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: None,
            endpoint: None,
            public_base_url: None,
        }
    }

    async fn presign(config: S3Config, content_type: &str) -> String {
        S3Presigner::new(config)
            .unwrap()
            .presign_put(KEY, content_type, Duration::from_secs(300))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_presigned_url_targets_virtual_hosted_bucket() {
        let url = presign(config(), "image/png").await;

        assert!(url.starts_with(&format!(
            "https://quill-media.s3.eu-west-1.amazonaws.com/{KEY}?"
        )));
        assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(url.contains("X-Amz-Credential=AKIDEXAMPLE"));
        assert!(url.contains("X-Amz-Expires=300"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(!url.contains("X-Amz-Security-Token"));
    }

    #[tokio::test]
    async fn test_content_type_is_a_signed_header() {
        let url = presign(config(), "image/png").await;

        let signed_headers = url
            .split('&')
            .find_map(|pair| pair.strip_prefix("X-Amz-SignedHeaders="))
            .unwrap();
        assert!(signed_headers.contains("content-type"));
        assert!(signed_headers.contains("host"));
    }

    #[tokio::test]
    async fn test_session_token_is_signed_in() {
        let mut cfg = config();
        cfg.session_token = Some("session-token".to_string());

        let url = presign(cfg, "image/png").await;
        assert!(url.contains("X-Amz-Security-Token=session-token"));
    }

    #[tokio::test]
    async fn test_custom_endpoint_uses_path_style() {
        let mut cfg = config();
        cfg.endpoint = Some("http://localhost:9000".to_string());

        let url = presign(cfg.clone(), "image/webp").await;
        assert!(url.starts_with(&format!("http://localhost:9000/quill-media/{KEY}?")));
        assert_eq!(
            S3Presigner::new(cfg).unwrap().public_url(KEY),
            format!("http://localhost:9000/quill-media/{KEY}")
        );
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            S3Presigner::new(config()).unwrap().public_url(KEY),
            format!("https://quill-media.s3.eu-west-1.amazonaws.com/{KEY}")
        );

        let mut cfg = config();
        cfg.public_base_url = Some("https://cdn.quill.test".to_string());
        assert_eq!(
            S3Presigner::new(cfg).unwrap().public_url(KEY),
            format!("https://cdn.quill.test/{KEY}")
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("EXAMPLEKEY"));
    }
}
