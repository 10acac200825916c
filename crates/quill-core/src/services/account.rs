//! Registration, login and profile lookup.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::error::{DomainError, RepoError, UniqueKey};
use crate::ports::{AuthError, PasswordService, TokenService, UserRepository};

pub const MIN_PASSWORD_LEN: usize = 8;

const DEFAULT_ROLES: [&str; 1] = ["user"];

/// A freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub expires_in: u64,
}

/// Account manager.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError> {
        let name = name.trim();
        let email = email.trim().to_lowercase();

        if name.is_empty() {
            return Err(DomainError::validation("name", "Name must not be empty"));
        }
        if !is_plausible_email(&email) {
            return Err(DomainError::validation("email", "Invalid email address"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(email_taken());
        }

        let hash = self.passwords.hash(password).map_err(internal)?;
        let user = match self
            .users
            .save(User::new(name.to_string(), email, hash))
            .await
        {
            Ok(user) => user,
            Err(RepoError::Duplicate(UniqueKey::UserEmail)) => return Err(email_taken()),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "User registered");
        self.issue(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(DomainError::InvalidCredentials);
        };

        if !self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(internal)?
        {
            tracing::warn!(user_id = %user.id, "Rejected login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, "User logged in");
        self.issue(user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {user_id} not found")))
    }

    fn issue(&self, user: User) -> Result<Session, DomainError> {
        let roles = DEFAULT_ROLES.iter().map(|r| r.to_string()).collect();
        let access_token = self
            .tokens
            .generate_token(user.id, &user.email, &user.name, roles)
            .map_err(internal)?;

        Ok(Session {
            user,
            access_token,
            expires_in: self.tokens.expiration_seconds().max(0) as u64,
        })
    }
}

fn email_taken() -> DomainError {
    DomainError::Conflict("Email already registered".to_string())
}

fn internal(err: AuthError) -> DomainError {
    DomainError::Internal(err.to_string())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("ada@example.com"));
        assert!(!is_plausible_email("ada.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ada@localhost"));
        assert!(!is_plausible_email("a@b@c.com"));
    }
}
