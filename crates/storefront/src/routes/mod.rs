//! HTTP route handlers for the marketplace.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (DB connectivity)
//!
//! # Offers
//! GET  /offers                 - Offer listing (optional ?q= title filter)
//! GET  /offers/{id}            - Offer detail
//! POST /offers                 - Create offer (multipart; sellers only)
//! GET  /img/{name}             - Serve a stored offer image
//!
//! # Cart
//! GET  /cart                   - Resolved cart view (requires auth)
//! POST /cart/add               - Add offer to cart (requires auth)
//!
//! # Checkout
//! GET  /checkout               - Checkout view (requires auth)
//! POST /checkout               - Submit checkout, redirect to gateway
//! GET  /checkout/success       - Gateway success callback (stateless)
//! GET  /checkout/cancel        - Gateway cancel callback (stateless)
//!
//! # Auth
//! POST /auth/register          - Register
//! POST /auth/login             - Login (sets session)
//! POST /auth/logout            - Logout (flushes session)
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod images;
pub mod offers;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the offer routes router.
pub fn offer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(offers::index).post(offers::create))
        .route("/{id}", get(offers::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
}

/// Create all routes for the marketplace.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Offer routes
        .nest("/offers", offer_routes())
        // Offer images
        .route("/img/{name}", get(images::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::view).post(checkout::submit))
        .route("/checkout/success", get(checkout::success))
        .route("/checkout/cancel", get(checkout::cancel))
        // Auth routes
        .nest("/auth", auth_routes())
}
