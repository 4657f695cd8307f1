//! Checkout orchestration.
//!
//! Turns the cart into a hosted payment session:
//! `Viewing -> Submitting -> { Redirected, Failed }`.
//!
//! Submission order matters. The gateway session is created BEFORE the cart
//! is cleared, so a gateway failure leaves the cart exactly as it was. The
//! clear is then a compare-and-swap against the snapshot that was priced:
//! anything added to the cart in the meantime fails the swap instead of
//! being silently thrown away, and of two racing submissions only one can
//! clear.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use tradepost_core::{PriceError, UserId};

use crate::db::RepositoryError;
use crate::db::offers::OfferRepository;
use crate::db::users::UserRepository;
use crate::models::cart::CartView;
use crate::payments::{LineItem, PaymentError, PaymentGateway};

use super::cart::{CartError, CartService};

/// Currency for all payment sessions. Multi-currency is out of scope.
const CURRENCY: &str = "usd";

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart held no purchasable items.
    #[error("your cart is empty")]
    EmptyCart,

    /// A cart offer carried a price that cannot be converted to minor units.
    #[error("invalid price on a cart item: {0}")]
    InvalidPrice(#[from] PriceError),

    /// The cart was modified between pricing and clearing.
    #[error("the cart changed during checkout")]
    CartChanged,

    /// The payment gateway rejected or failed the session request.
    #[error("payment gateway error: {0}")]
    PaymentGateway(#[from] PaymentError),

    /// The user row does not exist.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CheckoutError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::UserNotFound,
            other => Self::Repository(other),
        }
    }
}

impl From<CartError> for CheckoutError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::Unauthorized | CartError::UserNotFound => Self::UserNotFound,
            CartError::Repository(other) => Self::Repository(other),
        }
    }
}

/// Checkout service.
pub struct CheckoutService<'a> {
    users: UserRepository<'a>,
    offers: OfferRepository<'a>,
    cart: CartService<'a>,
    gateway: &'a dyn PaymentGateway,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, gateway: &'a dyn PaymentGateway) -> Self {
        Self {
            users: UserRepository::new(pool),
            offers: OfferRepository::new(pool),
            cart: CartService::new(pool),
            gateway,
        }
    }

    /// The checkout page view: the resolved cart, no side effects.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::UserNotFound` if the user does not exist.
    pub async fn render_checkout(&self, user_id: UserId) -> Result<CartView, CheckoutError> {
        Ok(self.cart.load_cart(user_id).await?)
    }

    /// Submit the cart for payment.
    ///
    /// Prices the cart as stored right now, creates a gateway session, and
    /// only then clears the cart. Returns the gateway redirect URL.
    ///
    /// # Errors
    ///
    /// - `EmptyCart` if nothing in the cart resolves to a live offer.
    /// - `PaymentGateway` if the session request fails; the cart is untouched.
    /// - `CartChanged` if the cart was mutated after pricing; the cart is
    ///   untouched and the created session is abandoned (hosted sessions
    ///   expire on the gateway side).
    pub async fn submit(
        &self,
        user_id: UserId,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, CheckoutError> {
        // 1. Authoritative snapshot; its verbatim text is the CAS token
        let snapshot = self.users.cart_snapshot(user_id).await?;

        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // 2. Price each entry at its current catalog price
        let mut line_items = Vec::with_capacity(snapshot.offer_ids.len());
        for offer_id in &snapshot.offer_ids {
            match self.offers.get(*offer_id).await? {
                Some(offer) => line_items.push(LineItem {
                    name: offer.title,
                    unit_amount: offer.price.minor_units()?,
                    currency: CURRENCY.to_owned(),
                    quantity: 1,
                }),
                None => {
                    warn!(offer = %offer_id, user = %user_id, "skipping missing offer at checkout");
                }
            }
        }

        if line_items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // 3. Gateway first; a failure here must leave the cart as it was
        let session = self
            .gateway
            .create_session(&line_items, success_url, cancel_url)
            .await?;

        // 4. Clear only the exact cart that was priced
        let cleared = self
            .users
            .clear_cart_if_unchanged(user_id, &snapshot.raw)
            .await?;

        if !cleared {
            warn!(user = %user_id, "cart changed between pricing and clearing; abandoning session");
            return Err(CheckoutError::CartChanged);
        }

        info!(user = %user_id, items = line_items.len(), "checkout redirected to payment gateway");
        Ok(session.url)
    }
}
