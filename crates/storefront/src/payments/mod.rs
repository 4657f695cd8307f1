//! Payment gateway integration.
//!
//! The gateway hosts the actual payment UI; the marketplace only creates a
//! checkout session from priced line items and redirects the buyer to it.
//! The [`PaymentGateway`] trait is the seam: production uses [`StripeClient`],
//! tests substitute an in-process fake.

mod stripe;

pub use stripe::StripeClient;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A single priced line in a payment request.
///
/// Amounts are integer minor units (cents); the conversion from decimal
/// prices happens before a `LineItem` is built, never inside the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Product name shown on the hosted payment page.
    pub name: String,
    /// Unit price in minor units (e.g. cents).
    pub unit_amount: i64,
    /// Lowercase ISO 4217 currency code.
    pub currency: String,
    /// Number of units.
    pub quantity: u32,
}

/// A hosted payment session created by the gateway.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    /// URL the buyer is redirected to.
    pub url: String,
}

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Transport-level failure reaching the gateway.
    #[error("payment gateway unreachable: {0}")]
    Http(#[source] reqwest::Error),

    /// The gateway did not respond within the configured timeout.
    #[error("payment gateway timed out")]
    Timeout,

    /// The gateway rejected the request.
    #[error("payment gateway rejected the request (HTTP {status})")]
    Api {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Truncated response body for diagnostics.
        message: String,
    },

    /// The gateway response could not be parsed.
    #[error("invalid payment gateway response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for PaymentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// An external service that hosts checkout for a list of priced line items.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted payment session.
    ///
    /// On success the buyer should be redirected to [`PaymentSession::url`];
    /// the gateway later calls back on the success or cancel URL.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the session cannot be created. Callers must
    /// treat a failure as "no payment will happen" and leave local state
    /// untouched.
    async fn create_session(
        &self,
        line_items: &[LineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<PaymentSession, PaymentError>;
}
