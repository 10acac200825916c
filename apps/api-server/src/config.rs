//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use quill_core::services::UploadPolicy;
use quill_infra::{DatabaseConfig, JwtConfig};

#[cfg(feature = "rate-limit")]
use quill_infra::RateLimitConfig;
#[cfg(feature = "storage")]
use quill_infra::S3Config;

#[cfg(feature = "scheduler")]
use crate::background::SchedulerConfig;
use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations on startup.
    pub run_migrations: bool,
    pub jwt: JwtConfig,
    pub upload: UploadPolicy,
    #[cfg(feature = "storage")]
    pub storage: Option<S3Config>,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[cfg(feature = "scheduler")]
    pub scheduler: SchedulerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut db = DatabaseConfig::new(url);
            db.max_connections = parse_var("DB_MAX_CONNECTIONS").unwrap_or(db.max_connections);
            db.min_connections = parse_var("DB_MIN_CONNECTIONS").unwrap_or(db.min_connections);
            db
        });

        let mut upload = UploadPolicy::default();
        if let Some(max) = parse_var::<u64>("MAX_UPLOAD_BYTES").filter(|max| *max > 0) {
            upload.max_file_size_bytes = max;
        }

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            run_migrations: flag("RUN_MIGRATIONS", true),
            jwt: JwtConfig::from_env(),
            upload,
            #[cfg(feature = "storage")]
            storage: S3Config::from_env(),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::from_env(),
            #[cfg(feature = "scheduler")]
            scheduler: SchedulerConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }
}

pub(crate) fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Boolean switch; anything but `false`/`0` counts as on.
pub(crate) fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}
