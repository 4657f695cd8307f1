//! Offer domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tradepost_core::{OfferId, Price, Username};

/// A seller's listing (domain type).
///
/// Immutable after creation. Carts reference offers by id, so the price here
/// is always the price at read time, never a cached copy.
#[derive(Debug, Clone, Serialize)]
pub struct Offer {
    /// Unique offer ID.
    pub id: OfferId,
    /// Username of the listing seller.
    pub owner: Username,
    /// Listing title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Stored image filename, served under `/img/{name}`.
    pub image: String,
    /// When the offer was listed.
    pub created_at: DateTime<Utc>,
}
