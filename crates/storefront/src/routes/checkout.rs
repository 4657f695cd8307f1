//! Checkout route handlers.
//!
//! The submit handler is a thin wrapper over the checkout service; the
//! success and cancel pages are stateless views the payment gateway sends
//! the buyer back to, and perform no mutation (the cart was already cleared
//! when the session was created).

use axum::{
    Json,
    extract::State,
    response::Redirect,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::CartView;
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Simple message payload for the callback pages.
#[derive(Debug, Serialize)]
pub struct CheckoutMessage {
    pub message: &'static str,
}

/// The checkout page view: the resolved cart, no side effects.
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn view(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let checkout = CheckoutService::new(state.pool(), state.gateway());
    Ok(Json(checkout.render_checkout(user.id).await?))
}

/// Submit the cart for payment and redirect to the gateway.
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Redirect> {
    let base = state.config().base_url.trim_end_matches('/');
    let success_url = format!("{base}/checkout/success");
    let cancel_url = format!("{base}/checkout/cancel");

    let checkout = CheckoutService::new(state.pool(), state.gateway());
    let redirect_url = checkout.submit(user.id, &success_url, &cancel_url).await?;

    Ok(Redirect::to(&redirect_url))
}

/// Gateway success callback page.
pub async fn success() -> Json<CheckoutMessage> {
    Json(CheckoutMessage {
        message: "Payment complete. Thank you for your purchase!",
    })
}

/// Gateway cancel callback page.
pub async fn cancel() -> Json<CheckoutMessage> {
    Json(CheckoutMessage {
        message: "Payment cancelled.",
    })
}
