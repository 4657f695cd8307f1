//! Offer repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use tradepost_core::{OfferId, Price, Username};

use super::RepositoryError;
use crate::models::offer::Offer;

/// Repository for offer database operations.
pub struct OfferRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OfferRepository<'a> {
    /// Create a new offer repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new offer and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        owner: &Username,
        title: &str,
        price: Price,
        image: &str,
    ) -> Result<OfferId, RepositoryError> {
        let row = sqlx::query(
            r#"
            INSERT INTO offers (owner_username, title, price, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(owner.as_str())
        .bind(title)
        .bind(price.to_string())
        .bind(image)
        .fetch_one(self.pool)
        .await?;

        Ok(OfferId::new(row.try_get("id")?))
    }

    /// Get an offer by its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get(&self, id: OfferId) -> Result<Option<Offer>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_username, title, price, image, created_at
            FROM offers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| offer_from_row(&r)).transpose()
    }

    /// List offers, optionally filtered by a title substring.
    ///
    /// Without a filter, every offer is returned in insertion (id) order.
    /// The filter is a case-insensitive substring match on the title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<Offer>, RepositoryError> {
        let rows = match filter {
            Some(term) => {
                sqlx::query(
                    r#"
                    SELECT id, owner_username, title, price, image, created_at
                    FROM offers
                    WHERE title LIKE $1
                    ORDER BY id ASC
                    "#,
                )
                .bind(format!("%{term}%"))
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, owner_username, title, price, image, created_at
                    FROM offers
                    ORDER BY id ASC
                    "#,
                )
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.iter().map(offer_from_row).collect()
    }
}

/// Decode an offer row into the domain type.
fn offer_from_row(row: &SqliteRow) -> Result<Offer, RepositoryError> {
    let owner: String = row.try_get("owner_username")?;
    let owner = Username::parse(&owner).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid offer owner in database: {e}"))
    })?;

    let price: String = row.try_get("price")?;
    let price = Price::parse(&price)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid price in database: {e}")))?;

    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Offer {
        id: OfferId::new(row.try_get("id")?),
        owner,
        title: row.try_get("title")?,
        price,
        image: row.try_get("image")?,
        created_at,
    })
}
