//! Integration test harness for Tradepost.
//!
//! Each test gets its own SQLite database in a temporary directory, a fresh
//! image store, and an in-process payment gateway double. Tests drive the
//! service layer directly, the same code paths the route handlers use.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tradepost-integration-tests
//! ```

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use secrecy::SecretString;
use sqlx::SqlitePool;
use tempfile::TempDir;

use tradepost_storefront::db;
use tradepost_storefront::payments::{LineItem, PaymentError, PaymentGateway, PaymentSession};
use tradepost_storefront::services::images::ImageStore;

/// The redirect URL the mock gateway hands back.
pub const MOCK_SESSION_URL: &str = "https://gateway.test/session/abc123";

/// A payment gateway double.
///
/// Records every session request and can be switched into a failing mode to
/// exercise the gateway-failure path.
#[derive(Default)]
pub struct MockGateway {
    /// Line items of every session request received, in order.
    pub requests: Mutex<Vec<Vec<LineItem>>>,
    fail: AtomicBool,
}

impl MockGateway {
    /// Create a gateway that accepts every session request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent session request fail with a timeout.
    pub fn fail_next_requests(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// The line items of the only recorded request.
    ///
    /// # Panics
    ///
    /// Panics if zero or more than one request was recorded.
    #[must_use]
    pub fn single_request(&self) -> Vec<LineItem> {
        let requests = self.requests.lock().expect("requests lock poisoned");
        assert_eq!(requests.len(), 1, "expected exactly one gateway request");
        requests.first().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(
        &self,
        line_items: &[LineItem],
        _success_url: &str,
        _cancel_url: &str,
    ) -> Result<PaymentSession, PaymentError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentError::Timeout);
        }

        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(line_items.to_vec());

        Ok(PaymentSession {
            url: MOCK_SESSION_URL.to_string(),
        })
    }
}

/// Per-test environment: a migrated SQLite database plus an image store,
/// both living in a temporary directory that is removed on drop.
pub struct TestContext {
    pub pool: SqlitePool,
    pub images: ImageStore,
    _tmp: TempDir,
}

impl TestContext {
    /// Create a fresh database and image store.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created or migrated; tests cannot
    /// proceed without it.
    pub async fn new() -> Self {
        let tmp = TempDir::new().expect("Failed to create temp dir");

        let db_path = tmp.path().join("market.db");
        let url = SecretString::from(format!("sqlite://{}", db_path.display()));

        let pool = db::create_pool(&url)
            .await
            .expect("Failed to create database pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let images = ImageStore::open(tmp.path().join("imgs"))
            .await
            .expect("Failed to create image store");

        Self {
            pool,
            images,
            _tmp: tmp,
        }
    }
}

/// A one-pixel PNG stand-in for uploaded offer images.
#[must_use]
pub fn png_fixture() -> Vec<u8> {
    // Content is irrelevant to the store; only the extension is checked
    b"\x89PNG\r\n\x1a\nfixture".to_vec()
}
