//! Authentication service.
//!
//! Password registration and login. Session handling lives in the middleware
//! layer; this service only resolves credentials to users.

mod error;

pub use error::{AuthError, RegisterError};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use tradepost_core::{Email, Role, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Registration and login against the local `users` table.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Build the service over a borrowed pool.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// The new account starts with an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::MissingField` if username, email, or password
    /// is empty. Returns `RegisterError::DuplicateIdentity` if the username
    /// or email is already registered (without revealing which).
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserId, RegisterError> {
        // Empty fields are reported before any format validation or storage access
        if username.is_empty() {
            return Err(RegisterError::MissingField("username"));
        }
        if email.is_empty() {
            return Err(RegisterError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(RegisterError::MissingField("password"));
        }

        let username = Username::parse(username)?;
        let email = Email::parse(email)?;

        let password_hash = hash_password(password).map_err(|_| RegisterError::PasswordHash)?;

        let user_id = self
            .users
            .create(&username, &email, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => RegisterError::DuplicateIdentity,
                other => RegisterError::Repository(other),
            })?;

        Ok(user_id)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email and for a
    /// wrong password alike.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // A malformed email can't match any account; same generic error
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Argon2id-hash a password with a fresh random salt, PHC string output.
fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Check a password against a stored PHC string. Any failure, including an
/// unparseable hash, reads as bad credentials.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("pw123").unwrap();
        assert!(verify_password("pw123", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("pw123", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
