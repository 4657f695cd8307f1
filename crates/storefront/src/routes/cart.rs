//! Cart route handlers.

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use tradepost_core::OfferId;

use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CartView;
use crate::services::cart::{CartError, CartService};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub offer_id: i64,
}

/// Display the caller's resolved cart.
#[instrument(skip(state, user), fields(user = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let cart = CartService::new(state.pool());
    Ok(Json(cart.load_cart(user.id).await?))
}

/// Add an offer to the caller's cart.
///
/// Anonymous callers are rejected before anything else is looked at. The
/// offer must exist at insertion time; nothing prevents it disappearing
/// later, the cart view copes with that.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<StatusCode> {
    if user.is_none() {
        return Err(CartError::Unauthorized.into());
    }

    let offer_id = OfferId::new(form.offer_id);

    let catalog = CatalogService::new(state.pool(), state.images());
    if catalog.get(offer_id).await?.is_none() {
        return Err(AppError::NotFound(format!("offer {offer_id}")));
    }

    let cart = CartService::new(state.pool());
    cart.add_item(user.as_ref(), offer_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
