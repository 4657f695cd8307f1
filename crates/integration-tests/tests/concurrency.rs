//! Concurrency tests: cart appends must not lose updates.

use std::collections::HashSet;

use tradepost_core::{OfferId, Role, Username};
use tradepost_integration_tests::{TestContext, png_fixture};
use tradepost_storefront::models::CurrentUser;
use tradepost_storefront::services::auth::AuthService;
use tradepost_storefront::services::cart::CartService;
use tradepost_storefront::services::catalog::CatalogService;

const NUM_ADDS: usize = 8;

#[tokio::test]
async fn test_concurrent_adds_all_land() {
    let ctx = TestContext::new().await;

    let buyer_id = AuthService::new(&ctx.pool)
        .register("alice", "a@x.com", "pw123", Role::Buyer)
        .await
        .expect("Failed to register buyer");
    let buyer = CurrentUser {
        id: buyer_id,
        username: Username::parse("alice").expect("invalid test username"),
        role: Role::Buyer,
    };

    let owner = Username::parse("bob").expect("invalid test username");
    let catalog = CatalogService::new(&ctx.pool, &ctx.images);
    let mut offers = Vec::with_capacity(NUM_ADDS);
    for i in 0..NUM_ADDS {
        let id = catalog
            .create(
                &owner,
                &format!("Offer {i}"),
                "5.00",
                &format!("offer-{i}.png"),
                &png_fixture(),
            )
            .await
            .expect("Failed to create offer");
        offers.push(id);
    }

    // Fire all adds at once; each task gets its own pool handle
    let mut handles = Vec::with_capacity(NUM_ADDS);
    for offer_id in &offers {
        let pool = ctx.pool.clone();
        let buyer = buyer.clone();
        let offer_id = *offer_id;
        handles.push(tokio::spawn(async move {
            CartService::new(&pool).add_item(Some(&buyer), offer_id).await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("task panicked")
            .expect("concurrent add should succeed");
    }

    // Every add landed, none overwrote another
    let view = CartService::new(&ctx.pool)
        .load_cart(buyer.id)
        .await
        .expect("load should succeed");
    assert_eq!(view.items.len(), NUM_ADDS);

    let got: HashSet<OfferId> = view.items.iter().map(|o| o.id).collect();
    let expected: HashSet<OfferId> = offers.into_iter().collect();
    assert_eq!(got, expected);
}
