//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! persistence, authentication, rate limiting and object storage signing.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Per-key rate limiting via governor
//! - `storage` - S3 SigV4 presigned upload URLs

pub mod database;
pub mod memory;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use database::DatabaseConfig;
pub use memory::InMemoryStore;
pub use storage::UnconfiguredSigner;

#[cfg(feature = "postgres")]
pub use database::{
    PostgresCommentRepository, PostgresLikeRepository, PostgresPostRepository,
    PostgresUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{KeyedRateLimiter, RateLimitConfig};

#[cfg(feature = "storage")]
pub use storage::{S3Config, S3Presigner};
