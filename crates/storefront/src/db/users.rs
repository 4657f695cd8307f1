//! User repository for database operations.
//!
//! Holds account data and the embedded cart. Every cart mutation is a single
//! UPDATE statement against the user row: appends go through SQLite's
//! `json_insert`, and checkout's clear is a compare-and-swap on the stored
//! cart text. No cart mutation is ever a read followed by an unguarded write.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use tradepost_core::{Email, OfferId, Role, UserId, Username};

use super::RepositoryError;
use crate::models::cart::CartSnapshot;
use crate::models::user::User;

/// Queries against the `users` table.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Borrow the pool for user-row operations.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account with an empty cart, returning its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the username or email is
    /// already taken, `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
        role: Role,
    ) -> Result<UserId, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role, cart)
            VALUES ($1, $2, $3, $4, '[]')
            RETURNING id
            "#,
        )
        .bind(username.as_str())
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username or email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(UserId::new(row.try_get("id")?))
    }

    /// Get a user plus their password hash by email.
    ///
    /// Returns `None` if no user has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, role, created_at, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let password_hash: String = r.try_get("password_hash")?;
        let user = user_from_row(&r)?;

        Ok(Some((user, password_hash)))
    }

    /// Append an offer id to the user's cart.
    ///
    /// A single atomic UPDATE via `json_insert`; two concurrent appends for
    /// the same user both land.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn append_cart_item(
        &self,
        user_id: UserId,
        offer_id: OfferId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET cart = json_insert(cart, '$[#]', $1)
            WHERE id = $2
            "#,
        )
        .bind(offer_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Read the user's cart as stored.
    ///
    /// The returned snapshot keeps the verbatim stored text alongside the
    /// parsed ids; [`Self::clear_cart_if_unchanged`] matches against that text.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::DataCorruption` if the stored cart is not a
    /// JSON array of integers.
    pub async fn cart_snapshot(&self, user_id: UserId) -> Result<CartSnapshot, RepositoryError> {
        let row = sqlx::query("SELECT cart FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let raw: String = row.try_get("cart")?;
        let ids: Vec<i64> = serde_json::from_str(&raw).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid cart for user {user_id}: {e}"))
        })?;

        Ok(CartSnapshot {
            raw,
            offer_ids: ids.into_iter().map(OfferId::new).collect(),
        })
    }

    /// Replace the user's cart with an empty one.
    ///
    /// Idempotent: clearing an already-empty cart succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET cart = '[]' WHERE id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Clear the cart only if it still matches the given snapshot text.
    ///
    /// Returns `true` if the cart was cleared, `false` if it changed since
    /// the snapshot was taken (a concurrent append or a competing checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_cart_if_unchanged(
        &self,
        user_id: UserId,
        snapshot_raw: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE users SET cart = '[]' WHERE id = $1 AND cart = $2")
            .bind(user_id)
            .bind(snapshot_raw)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Decode a user row into the domain type.
fn user_from_row(row: &SqliteRow) -> Result<User, RepositoryError> {
    let username: String = row.try_get("username")?;
    let username = Username::parse(&username).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
    })?;

    let email: String = row.try_get("email")?;
    let email = Email::parse(&email)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;

    let role: Role = row.try_get("role")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(User {
        id: UserId::new(row.try_get("id")?),
        username,
        email,
        role,
        created_at,
    })
}
