//! Bearer tokens and password hashing.

use uuid::Uuid;

/// Identity carried by a validated access token.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    /// Unix timestamp after which the token is rejected.
    pub exp: i64,
}

/// Issues and validates access tokens.
pub trait TokenService: Send + Sync {
    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        roles: Vec<String>,
    ) -> Result<String, AuthError>;

    /// Fails with `TokenExpired` or `InvalidToken`.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of issued tokens in seconds.
    fn expiration_seconds(&self) -> i64;
}

pub trait PasswordService: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
