//! Marketplace API endpoints.
//!
//! The browse catalog is embedded demo data; listing submissions are
//! validated and acknowledged, never persisted.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use super::{error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::listing::{self, CATEGORIES, CONDITIONS};
use crate::models::{CreateListingRequest, ListingAck, ListingKind, ListingsQuery, MarketListing};
use crate::AppState;

/// Maximum images per listing.
const MAX_LISTING_IMAGES: usize = 3;

/// GET /api/marketplace/listings - Browse the catalog with filters.
pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<ListingsQuery>,
) -> ApiResult<Vec<MarketListing>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let listings: Vec<MarketListing> = listing::catalog()
        .into_iter()
        .filter(|l| l.matches_filter(&params.search, &params.category, params.kind))
        .collect();

    success(listings, revision_id)
}

/// POST /api/marketplace/listings - Validate and acknowledge a listing.
pub async fn create_listing(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Json(request): Json<CreateListingRequest>,
) -> ApiResult<ListingAck> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.title.trim().is_empty() || request.description.trim().is_empty() {
        return error(
            AppError::Validation("Title and description are required".to_string()),
            revision_id,
        );
    }
    if !CATEGORIES.contains(&request.category.as_str()) {
        return error(
            AppError::Validation(format!("Unknown category: {}", request.category)),
            revision_id,
        );
    }
    if !CONDITIONS.contains(&request.condition.as_str()) {
        return error(
            AppError::Validation(format!("Unknown condition: {}", request.condition)),
            revision_id,
        );
    }
    if request.image_urls.is_empty() {
        return error(
            AppError::Validation("At least one image is required".to_string()),
            revision_id,
        );
    }
    if request.image_urls.len() > MAX_LISTING_IMAGES {
        return error(
            AppError::Validation(format!(
                "At most {} images are allowed",
                MAX_LISTING_IMAGES
            )),
            revision_id,
        );
    }
    if request.kind == ListingKind::Sell && request.price.unwrap_or(0) <= 0 {
        return error(
            AppError::Validation("A price is required for items listed for sale".to_string()),
            revision_id,
        );
    }

    tracing::info!(
        "Listing '{}' ({}) submitted by {}",
        request.title,
        request.kind.as_str(),
        account.email
    );

    success(
        ListingAck {
            id: uuid::Uuid::new_v4().to_string(),
            title: request.title.trim().to_string(),
            kind: request.kind,
            submitted_at: Utc::now().to_rfc3339(),
        },
        revision_id,
    )
}
