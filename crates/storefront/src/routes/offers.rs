//! Offer route handlers: browsing, searching, and seller listing.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tradepost_core::{OfferId, Role};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Offer;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Query parameters for offer listing.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Optional title substring filter.
    pub q: Option<String>,
}

/// Response for a created offer.
#[derive(Debug, Serialize)]
pub struct CreateOfferResponse {
    pub id: OfferId,
}

/// List offers, optionally filtered by a title substring.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Offer>>> {
    let catalog = CatalogService::new(state.pool(), state.images());
    let offers = catalog.list(query.q.as_deref()).await?;
    Ok(Json(offers))
}

/// Offer detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Offer>> {
    let catalog = CatalogService::new(state.pool(), state.images());
    let offer = catalog
        .get(OfferId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("offer {id}")))?;
    Ok(Json(offer))
}

/// Create a new offer from a multipart listing form (sellers only).
///
/// Expects `title` and `price` text fields and an `image` file field.
#[instrument(skip(state, user, multipart), fields(seller = %user.username))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateOfferResponse>)> {
    // Role gate: the enum is closed, so this match is exhaustive
    match user.role {
        Role::Seller => {}
        Role::Buyer => {
            return Err(AppError::Forbidden(
                "only sellers can list offers".to_string(),
            ));
        }
    }

    let mut title = None;
    let mut price = None;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("title") => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            Some("price") => {
                price = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            Some("image") => {
                let filename = field
                    .file_name()
                    .ok_or_else(|| {
                        AppError::BadRequest("please select an image for your offer".to_string())
                    })?
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                image = Some((filename, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let title = title.ok_or_else(|| AppError::BadRequest("title is required".to_string()))?;
    let price = price.ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;
    let (image_name, image_bytes) = image
        .ok_or_else(|| AppError::BadRequest("please select an image for your offer".to_string()))?;

    let catalog = CatalogService::new(state.pool(), state.images());
    let id = catalog
        .create(&user.username, &title, &price, &image_name, &image_bytes)
        .await?;

    Ok((StatusCode::CREATED, Json(CreateOfferResponse { id })))
}
