//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CommentRepository, LikeRepository, PasswordService, PostRepository, TokenService,
    UploadSigner, UserRepository,
};
use quill_core::services::{
    AccountService, CommentService, LikeService, PostService, UploadPolicy, UploadService,
};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService, UnconfiguredSigner};

use crate::config::AppConfig;

/// Repository set backing the services.
#[derive(Clone)]
pub struct Repositories {
    pub backend: &'static str,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    /// Process-local store. Data is lost on restart.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            backend: "memory",
            users: store.clone(),
            posts: store.clone(),
            likes: store.clone(),
            comments: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: quill_infra::database::DbConn) -> Self {
        use quill_infra::{
            PostgresCommentRepository, PostgresLikeRepository, PostgresPostRepository,
            PostgresUserRepository,
        };

        Self {
            backend: "postgres",
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            likes: Arc::new(PostgresLikeRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db)),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub backend: &'static str,
    pub accounts: AccountService,
    pub posts: PostService,
    pub likes: LikeService,
    pub comments: CommentService,
    pub uploads: UploadService,
    pub tokens: Arc<dyn TokenService>,
}

impl AppState {
    /// Wire services over the given adapters.
    pub fn new(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        signer: Arc<dyn UploadSigner>,
        upload_policy: UploadPolicy,
    ) -> Self {
        Self {
            backend: repos.backend,
            accounts: AccountService::new(repos.users.clone(), passwords, tokens.clone()),
            posts: PostService::new(repos.posts.clone()),
            likes: LikeService::new(repos.likes.clone(), repos.posts.clone()),
            comments: CommentService::new(repos.comments.clone(), repos.posts.clone()),
            uploads: UploadService::new(signer, upload_policy),
            tokens,
        }
    }

    /// Build the state from configuration.
    ///
    /// Without `DATABASE_URL` the in-memory store is used. A configured
    /// database that cannot be reached or migrated aborts startup.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let repos = Self::repositories(config).await?;
        tracing::info!(backend = repos.backend, "Application state initialized");

        Ok(Self::new(
            repos,
            Arc::new(JwtTokenService::new(config.jwt.clone())),
            Arc::new(Argon2PasswordService::new()),
            Self::signer(config),
            config.upload.clone(),
        ))
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
        use anyhow::Context;
        use migration::{Migrator, MigratorTrait};

        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Repositories::in_memory());
        };

        let db = quill_infra::database::connect(db_config)
            .await
            .context("Failed to connect to the configured database")?;

        if config.run_migrations {
            Migrator::up(&db, None)
                .await
                .context("Failed to apply database migrations")?;
            tracing::info!("Database migrations applied");
        }

        Ok(Repositories::postgres(db))
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> anyhow::Result<Repositories> {
        tracing::info!("Running without postgres feature - using in-memory store");
        Ok(Repositories::in_memory())
    }

    #[cfg(feature = "storage")]
    fn signer(config: &AppConfig) -> Arc<dyn UploadSigner> {
        match &config.storage {
            Some(s3) => match quill_infra::S3Presigner::new(s3.clone()) {
                Ok(presigner) => {
                    tracing::info!(bucket = %s3.bucket, region = %s3.region, "Upload signing enabled");
                    Arc::new(presigner)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Invalid S3 settings. Upload URLs are disabled.");
                    Arc::new(UnconfiguredSigner)
                }
            },
            None => {
                tracing::warn!("S3 credentials not set. Upload URLs are disabled.");
                Arc::new(UnconfiguredSigner)
            }
        }
    }

    #[cfg(not(feature = "storage"))]
    fn signer(_config: &AppConfig) -> Arc<dyn UploadSigner> {
        Arc::new(UnconfiguredSigner)
    }
}

#[cfg(all(test, feature = "postgres"))]
mod tests {
    use super::*;
    use quill_infra::DatabaseConfig;

    #[actix_web::test]
    async fn test_unusable_database_aborts_startup() {
        let mut config = AppConfig::from_env();
        config.database = Some(DatabaseConfig::new("unsupported://localhost/quill"));

        assert!(AppState::init(&config).await.is_err());
    }

    #[actix_web::test]
    async fn test_missing_database_url_uses_memory_store() {
        let mut config = AppConfig::from_env();
        config.database = None;

        let state = AppState::init(&config).await.unwrap();
        assert_eq!(state.backend, "memory");
    }
}
