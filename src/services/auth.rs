//! Credential verification and password hashing

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    error::{AppError, AppResult},
    models::Principal,
    repository::Repository,
};

/// Hashing scheme for stored credentials
#[cfg_attr(test, mockall::automock)]
pub trait PasswordEncoder: Send + Sync {
    fn encode(&self, raw: &str) -> AppResult<String>;

    fn matches(&self, raw: &str, encoded: &str) -> bool;
}

#[derive(Clone, Default)]
pub struct Argon2PasswordEncoder;

impl Argon2PasswordEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    fn matches(&self, raw: &str, encoded: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return false;
        };
        Argon2::default()
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Checks presented credentials against stored ones. Unknown usernames
/// are an error; a wrong password is a plain no-match.
#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    encoder: Arc<dyn PasswordEncoder>,
}

impl AuthService {
    pub fn new(repository: Repository, encoder: Arc<dyn PasswordEncoder>) -> Self {
        Self {
            repository,
            encoder,
        }
    }

    pub async fn verify(&self, username: &str, password: &str) -> AppResult<Option<Principal>> {
        let user = self
            .repository
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::PrincipalNotFound(format!("User {} not found", username)))?;

        if !self.encoder.matches(password, &user.password) {
            return Ok(None);
        }

        Ok(Some(Principal {
            username: user.username,
        }))
    }
}
