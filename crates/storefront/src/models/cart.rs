//! Cart types.

use serde::Serialize;

use tradepost_core::OfferId;

use super::Offer;

/// The raw cart state read from a user row.
///
/// `raw` is the exact stored JSON text; checkout uses it as the
/// compare-and-swap token when clearing, so it must not be re-serialized.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// The stored JSON text, verbatim.
    pub raw: String,
    /// The parsed offer ids, in insertion order.
    pub offer_ids: Vec<OfferId>,
}

impl CartSnapshot {
    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offer_ids.is_empty()
    }
}

/// A cart resolved against the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    /// The resolved offers, in insertion order.
    pub items: Vec<Offer>,
    /// How many cart entries referenced offers that no longer exist.
    pub unavailable: usize,
}
