//! Domain-level error types.

use std::fmt;

use thiserror::Error;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed on `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Unique keys enforced by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    PostSlug,
    TagName,
    Like,
    UserEmail,
    Unknown,
}

impl UniqueKey {
    /// Identify the violated key from a constraint or index name.
    pub fn from_constraint(message: &str) -> Self {
        if message.contains("idx_posts_slug") {
            Self::PostSlug
        } else if message.contains("idx_tags_name") {
            Self::TagName
        } else if message.contains("idx_likes_user_post") {
            Self::Like
        } else if message.contains("idx_users_email") {
            Self::UserEmail
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PostSlug => "post slug",
            Self::TagName => "tag name",
            Self::Like => "like",
            Self::UserEmail => "user email",
            Self::Unknown => "unique key",
        };
        f.write_str(name)
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Duplicate {0}")]
    Duplicate(UniqueKey),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound("Resource not found".to_string()),
            RepoError::Duplicate(key) => DomainError::Conflict(format!("Duplicate {key}")),
            RepoError::Constraint(msg) => DomainError::Conflict(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Persistence(msg),
        }
    }
}
