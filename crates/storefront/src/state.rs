//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::MarketConfig;
use crate::payments::{PaymentGateway, StripeClient};
use crate::services::images::{ImageError, ImageStore};

/// The process-wide resources every handler can reach: configuration, the
/// connection pool, the payment gateway, and the image store.
///
/// Clones are `Arc` handles to one shared inner value. The gateway sits
/// behind `dyn PaymentGateway` so tests can swap in a double.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketConfig,
    pool: SqlitePool,
    gateway: Arc<dyn PaymentGateway>,
    images: ImageStore,
}

impl AppState {
    /// Create a new application state with the production Stripe gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be created.
    pub async fn new(config: MarketConfig, pool: SqlitePool) -> Result<Self, ImageError> {
        let gateway = Arc::new(StripeClient::new(&config.stripe));
        Self::with_gateway(config, pool, gateway).await
    }

    /// Create application state around an explicit gateway implementation.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload directory cannot be created.
    pub async fn with_gateway(
        config: MarketConfig,
        pool: SqlitePool,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, ImageError> {
        let images = ImageStore::open(config.upload_dir.clone()).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
                images,
            }),
        })
    }

    /// The marketplace configuration.
    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.inner.config
    }

    /// The database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// The payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }

    /// The offer image store.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }
}
