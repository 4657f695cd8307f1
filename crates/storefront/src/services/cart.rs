//! Cart service: adding items and resolving the cart against the catalog.
//!
//! The cart itself is a list of offer ids on the user row; nothing about an
//! offer is copied into it. Resolution happens on every read, so a price
//! change between add-to-cart and checkout is picked up automatically.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;

use tradepost_core::{OfferId, UserId};

use crate::db::RepositoryError;
use crate::db::offers::OfferRepository;
use crate::db::users::UserRepository;
use crate::models::cart::CartView;
use crate::models::session::CurrentUser;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The caller is not logged in.
    #[error("you must be logged in to use the cart")]
    Unauthorized,

    /// The user row does not exist.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CartError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::UserNotFound,
            other => Self::Repository(other),
        }
    }
}

/// Cart service.
pub struct CartService<'a> {
    users: UserRepository<'a>,
    offers: OfferRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
            offers: OfferRepository::new(pool),
        }
    }

    /// Append an offer to the caller's cart.
    ///
    /// Requires an authenticated caller; the append itself is a single
    /// atomic UPDATE, so concurrent adds for the same user all land.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Unauthorized` if nobody is logged in and
    /// `CartError::UserNotFound` if the session references a deleted user.
    pub async fn add_item(
        &self,
        identity: Option<&CurrentUser>,
        offer_id: OfferId,
    ) -> Result<(), CartError> {
        let user = identity.ok_or(CartError::Unauthorized)?;
        self.users.append_cart_item(user.id, offer_id).await?;
        Ok(())
    }

    /// Resolve the user's cart against the catalog.
    ///
    /// Entries referencing offers that no longer exist are skipped; the view
    /// reports how many were dropped so the caller can warn the buyer.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user does not exist.
    pub async fn load_cart(&self, user_id: UserId) -> Result<CartView, CartError> {
        let snapshot = self.users.cart_snapshot(user_id).await?;

        let mut items = Vec::with_capacity(snapshot.offer_ids.len());
        let mut unavailable = 0;

        for offer_id in &snapshot.offer_ids {
            match self.offers.get(*offer_id).await? {
                Some(offer) => items.push(offer),
                None => {
                    warn!(offer = %offer_id, user = %user_id, "cart references missing offer");
                    unavailable += 1;
                }
            }
        }

        Ok(CartView { items, unavailable })
    }

    /// Replace the user's cart with an empty one.
    ///
    /// Idempotent: clearing an empty cart succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user does not exist.
    pub async fn clear(&self, user_id: UserId) -> Result<(), CartError> {
        self.users.clear_cart(user_id).await?;
        Ok(())
    }
}
