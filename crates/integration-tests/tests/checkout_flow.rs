//! Integration tests for the checkout state machine.
//!
//! These cover the invariants that matter: the gateway sees exactly the
//! priced snapshot, the cart clears exactly once, a gateway failure leaves
//! the cart untouched, and a concurrent mutation between pricing and
//! clearing is detected instead of silently dropped.

use async_trait::async_trait;
use sqlx::SqlitePool;

use tradepost_core::{OfferId, Role, UserId, Username};
use tradepost_integration_tests::{MOCK_SESSION_URL, MockGateway, TestContext, png_fixture};
use tradepost_storefront::db::users::UserRepository;
use tradepost_storefront::models::CurrentUser;
use tradepost_storefront::payments::{LineItem, PaymentError, PaymentGateway, PaymentSession};
use tradepost_storefront::services::auth::AuthService;
use tradepost_storefront::services::cart::CartService;
use tradepost_storefront::services::catalog::CatalogService;
use tradepost_storefront::services::checkout::{CheckoutError, CheckoutService};

const SUCCESS_URL: &str = "http://localhost:3000/checkout/success";
const CANCEL_URL: &str = "http://localhost:3000/checkout/cancel";

async fn register_buyer(ctx: &TestContext, username: &str, email: &str) -> CurrentUser {
    let id = AuthService::new(&ctx.pool)
        .register(username, email, "pw123", Role::Buyer)
        .await
        .expect("Failed to register buyer");
    CurrentUser {
        id,
        username: Username::parse(username).expect("invalid test username"),
        role: Role::Buyer,
    }
}

async fn list_offer(ctx: &TestContext, title: &str, price: &str) -> OfferId {
    let owner = Username::parse("bob").expect("invalid test username");
    CatalogService::new(&ctx.pool, &ctx.images)
        .create(&owner, title, price, &format!("{title}.png"), &png_fixture())
        .await
        .expect("Failed to create offer")
}

async fn cart_ids(ctx: &TestContext, user_id: UserId) -> Vec<i64> {
    let raw: String = sqlx::query_scalar("SELECT cart FROM users WHERE id = $1")
        .bind(user_id.as_i64())
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to read cart");
    serde_json::from_str(&raw).expect("cart is not a JSON array")
}

#[tokio::test]
async fn test_successful_checkout_prices_and_clears_the_cart() {
    let ctx = TestContext::new().await;
    let buyer = register_buyer(&ctx, "alice", "a@x.com").await;
    let offer = list_offer(&ctx, "Widget", "9.99").await;

    CartService::new(&ctx.pool)
        .add_item(Some(&buyer), offer)
        .await
        .expect("add should succeed");

    let gateway = MockGateway::new();
    let checkout = CheckoutService::new(&ctx.pool, &gateway);

    let url = checkout
        .submit(buyer.id, SUCCESS_URL, CANCEL_URL)
        .await
        .expect("checkout should succeed");
    assert_eq!(url, MOCK_SESSION_URL);

    // The gateway saw exactly the priced cart
    let items = gateway.single_request();
    assert_eq!(
        items,
        vec![LineItem {
            name: "Widget".to_string(),
            unit_amount: 999,
            currency: "usd".to_string(),
            quantity: 1,
        }]
    );

    // And the cart is now empty
    assert!(cart_ids(&ctx, buyer.id).await.is_empty());
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let ctx = TestContext::new().await;
    let buyer = register_buyer(&ctx, "alice", "a@x.com").await;

    let gateway = MockGateway::new();
    let checkout = CheckoutService::new(&ctx.pool, &gateway);

    let err = checkout
        .submit(buyer.id, SUCCESS_URL, CANCEL_URL)
        .await
        .expect_err("empty cart should be rejected");
    assert!(matches!(err, CheckoutError::EmptyCart));

    // No session was requested
    assert!(gateway.requests.lock().expect("lock poisoned").is_empty());
}

#[tokio::test]
async fn test_cart_of_only_stale_entries_is_rejected() {
    let ctx = TestContext::new().await;
    let buyer = register_buyer(&ctx, "alice", "a@x.com").await;
    let offer = list_offer(&ctx, "Widget", "9.99").await;

    CartService::new(&ctx.pool)
        .add_item(Some(&buyer), offer)
        .await
        .expect("add should succeed");

    sqlx::query("DELETE FROM offers WHERE id = $1")
        .bind(offer.as_i64())
        .execute(&ctx.pool)
        .await
        .expect("Failed to delete offer");

    let gateway = MockGateway::new();
    let checkout = CheckoutService::new(&ctx.pool, &gateway);

    let err = checkout
        .submit(buyer.id, SUCCESS_URL, CANCEL_URL)
        .await
        .expect_err("stale-only cart should be rejected");
    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn test_gateway_failure_leaves_the_cart_untouched() {
    let ctx = TestContext::new().await;
    let buyer = register_buyer(&ctx, "alice", "a@x.com").await;
    let offer = list_offer(&ctx, "Widget", "9.99").await;

    CartService::new(&ctx.pool)
        .add_item(Some(&buyer), offer)
        .await
        .expect("add should succeed");

    let gateway = MockGateway::new();
    gateway.fail_next_requests();
    let checkout = CheckoutService::new(&ctx.pool, &gateway);

    let err = checkout
        .submit(buyer.id, SUCCESS_URL, CANCEL_URL)
        .await
        .expect_err("gateway failure should surface");
    assert!(matches!(err, CheckoutError::PaymentGateway(_)));

    // The buyer lost nothing: the cart still holds the item
    assert_eq!(cart_ids(&ctx, buyer.id).await, vec![offer.as_i64()]);
}

#[tokio::test]
async fn test_checkout_uses_checkout_time_prices() {
    let ctx = TestContext::new().await;
    let buyer = register_buyer(&ctx, "alice", "a@x.com").await;
    let offer = list_offer(&ctx, "Widget", "9.99").await;

    CartService::new(&ctx.pool)
        .add_item(Some(&buyer), offer)
        .await
        .expect("add should succeed");

    // The price changes between add-to-cart and checkout
    sqlx::query("UPDATE offers SET price = '19.99' WHERE id = $1")
        .bind(offer.as_i64())
        .execute(&ctx.pool)
        .await
        .expect("Failed to update price");

    let gateway = MockGateway::new();
    CheckoutService::new(&ctx.pool, &gateway)
        .submit(buyer.id, SUCCESS_URL, CANCEL_URL)
        .await
        .expect("checkout should succeed");

    let items = gateway.single_request();
    assert_eq!(items.first().map(|i| i.unit_amount), Some(1999));
}

#[tokio::test]
async fn test_second_checkout_observes_an_empty_cart() {
    let ctx = TestContext::new().await;
    let buyer = register_buyer(&ctx, "alice", "a@x.com").await;
    let offer = list_offer(&ctx, "Widget", "9.99").await;

    CartService::new(&ctx.pool)
        .add_item(Some(&buyer), offer)
        .await
        .expect("add should succeed");

    let gateway = MockGateway::new();
    let checkout = CheckoutService::new(&ctx.pool, &gateway);

    checkout
        .submit(buyer.id, SUCCESS_URL, CANCEL_URL)
        .await
        .expect("first checkout should succeed");

    let err = checkout
        .submit(buyer.id, SUCCESS_URL, CANCEL_URL)
        .await
        .expect_err("second checkout should find nothing to pay for");
    assert!(matches!(err, CheckoutError::EmptyCart));
}

/// Gateway double that mutates the cart while the session is being created,
/// simulating an add-to-cart racing the checkout submission.
struct InterleavingGateway {
    pool: SqlitePool,
    user_id: UserId,
    extra_offer: OfferId,
}

#[async_trait]
impl PaymentGateway for InterleavingGateway {
    async fn create_session(
        &self,
        _line_items: &[LineItem],
        _success_url: &str,
        _cancel_url: &str,
    ) -> Result<PaymentSession, PaymentError> {
        UserRepository::new(&self.pool)
            .append_cart_item(self.user_id, self.extra_offer)
            .await
            .expect("interleaved add should succeed");

        Ok(PaymentSession {
            url: MOCK_SESSION_URL.to_string(),
        })
    }
}

#[tokio::test]
async fn test_concurrent_add_during_submission_is_not_silently_dropped() {
    let ctx = TestContext::new().await;
    let buyer = register_buyer(&ctx, "alice", "a@x.com").await;
    let priced = list_offer(&ctx, "Widget", "9.99").await;
    let racing = list_offer(&ctx, "Gadget", "25.00").await;

    CartService::new(&ctx.pool)
        .add_item(Some(&buyer), priced)
        .await
        .expect("add should succeed");

    let gateway = InterleavingGateway {
        pool: ctx.pool.clone(),
        user_id: buyer.id,
        extra_offer: racing,
    };
    let checkout = CheckoutService::new(&ctx.pool, &gateway);

    let err = checkout
        .submit(buyer.id, SUCCESS_URL, CANCEL_URL)
        .await
        .expect_err("a cart mutated mid-checkout must not be cleared");
    assert!(matches!(err, CheckoutError::CartChanged));

    // Nothing was lost: both the priced item and the racing item are present
    assert_eq!(
        cart_ids(&ctx, buyer.id).await,
        vec![priced.as_i64(), racing.as_i64()]
    );
}
