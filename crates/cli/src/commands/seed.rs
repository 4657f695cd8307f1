//! Seed the database with demo accounts and offers.
//!
//! Creates one seller and one buyer account plus a handful of offers with
//! generated placeholder images, so a fresh checkout can be exercised
//! end to end. Safe to run once against an empty database; re-running fails
//! on the duplicate accounts.

use secrecy::SecretString;
use tracing::info;

use tradepost_core::{Role, Username};
use tradepost_storefront::db;
use tradepost_storefront::services::auth::AuthService;
use tradepost_storefront::services::catalog::CatalogService;
use tradepost_storefront::services::images::ImageStore;

/// Demo offers: title and price.
const DEMO_OFFERS: &[(&str, &str)] = &[
    ("Hand-thrown ceramic mug", "24.00"),
    ("Walnut serving board", "58.50"),
    ("Linen tote bag", "19.99"),
];

/// A minimal placeholder image for seeded offers.
fn placeholder_svg(title: &str) -> Vec<u8> {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="240"><rect width="100%" height="100%" fill="#ddd"/><text x="50%" y="50%" text-anchor="middle">{title}</text></svg>"##
    )
    .into_bytes()
}

/// Run the seed command.
///
/// # Errors
///
/// Returns an error if environment variables are missing or any insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("MARKET_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "MARKET_DATABASE_URL not set")?;
    let upload_dir = std::env::var("MARKET_UPLOAD_DIR").unwrap_or_else(|_| "imgs".to_string());

    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let images = ImageStore::open(upload_dir).await?;

    let auth = AuthService::new(&pool);
    let seller_id = auth
        .register("demo-seller", "seller@example.test", "demo-password", Role::Seller)
        .await?;
    let buyer_id = auth
        .register("demo-buyer", "buyer@example.test", "demo-password", Role::Buyer)
        .await?;
    info!(%seller_id, %buyer_id, "created demo accounts");

    let seller = Username::parse("demo-seller")?;
    let catalog = CatalogService::new(&pool, &images);

    for (i, (title, price)) in DEMO_OFFERS.iter().copied().enumerate() {
        let image_name = format!("demo-offer-{i}.svg");
        let offer_id = catalog
            .create(&seller, title, price, &image_name, &placeholder_svg(title))
            .await?;
        info!(%offer_id, title, "created demo offer");
    }

    info!("Seed complete!");
    Ok(())
}
