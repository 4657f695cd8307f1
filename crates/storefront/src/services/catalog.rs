//! Catalog service: listing, searching, and creating offers.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};

use tradepost_core::{OfferId, Price, PriceError, Username};

use crate::db::RepositoryError;
use crate::db::offers::OfferRepository;
use crate::models::offer::Offer;

use super::images::{ImageError, ImageStore};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The offer title was empty.
    #[error("title is required")]
    MissingTitle,

    /// The price was not a positive decimal.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// The uploaded image was rejected or could not be stored.
    #[error("image error: {0}")]
    Image(#[from] ImageError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Catalog service.
///
/// Reads are plain queries; creation coordinates the image store and the
/// offer table so neither a record without an image nor an orphaned image
/// can survive a failure.
pub struct CatalogService<'a> {
    offers: OfferRepository<'a>,
    images: &'a ImageStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool, images: &'a ImageStore) -> Self {
        Self {
            offers: OfferRepository::new(pool),
            images,
        }
    }

    /// List offers, optionally filtered by a title substring.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<Offer>, CatalogError> {
        // An empty search term means "no filter", matching the search form
        // submitting an empty box
        let filter = filter.filter(|term| !term.is_empty());
        Ok(self.offers.list(filter).await?)
    }

    /// Get a single offer.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn get(&self, id: OfferId) -> Result<Option<Offer>, CatalogError> {
        Ok(self.offers.get(id).await?)
    }

    /// Create a new offer from a seller listing submission.
    ///
    /// The image is written to durable storage first; only then is the record
    /// inserted. If the insert fails the stored image is removed again, so a
    /// failure cannot leave a record pointing at a missing image or an image
    /// no record references.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingTitle`, `CatalogError::InvalidPrice`, or
    /// `CatalogError::Image` for rejected input, and
    /// `CatalogError::Repository` if the insert fails.
    pub async fn create(
        &self,
        owner: &Username,
        title: &str,
        price: &str,
        image_name: &str,
        image_bytes: &[u8],
    ) -> Result<OfferId, CatalogError> {
        if title.trim().is_empty() {
            return Err(CatalogError::MissingTitle);
        }

        let price = Price::parse(price)?;

        let stored_name = self.images.store(image_name, image_bytes).await?;

        let offer_id = match self.offers.create(owner, title, price, &stored_name).await {
            Ok(id) => id,
            Err(e) => {
                // Roll the image back; a failure here only logs, the insert
                // error is the one the caller needs
                if let Err(cleanup) = self.images.remove(&stored_name).await {
                    error!(image = %stored_name, error = %cleanup, "failed to remove image after insert failure");
                }
                return Err(e.into());
            }
        };

        info!(offer = %offer_id, seller = %owner, "offer listed");
        Ok(offer_id)
    }
}
