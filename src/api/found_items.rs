//! Found item API endpoints, including the claim verification flow.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{
    ClaimResponse, FoundItemRecord, FoundItemsQuery, FoundStatus, LogFoundItemRequest, Role,
    LOCATIONS,
};
use crate::verification::{self, ChecksumAuthorizer, ScanOutcome, ScanTiming};
use crate::AppState;

/// GET /api/found-items - Browse available items with optional search term
/// and location filters.
pub async fn list_found_items(
    State(state): State<AppState>,
    Query(params): Query<FoundItemsQuery>,
) -> ApiResult<Vec<FoundItemRecord>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_found_items().await {
        Ok(items) => {
            let filtered: Vec<FoundItemRecord> = items
                .into_iter()
                .filter(|item| item.matches_filter(&params.search, &params.location))
                .collect();
            success(filtered, revision_id)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/found-items/:id - Get a single found item.
pub async fn get_found_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<FoundItemRecord> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_found_item(&id).await {
        Ok(Some(item)) => success(item, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Found item {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/found-items - Log an item at the desk (staff and admins only).
pub async fn create_found_item(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Json(request): Json<LogFoundItemRequest>,
) -> ApiResult<FoundItemRecord> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if account.role == Role::Student {
        return error(
            AppError::Forbidden("Only staff can log found items".to_string()),
            revision_id,
        );
    }

    if request.name.trim().is_empty()
        || request.description.trim().is_empty()
        || request.location.trim().is_empty()
        || request.date_found.trim().is_empty()
    {
        return error(
            AppError::Validation("Name, description, location and date found are required".to_string()),
            revision_id,
        );
    }
    if !LOCATIONS.contains(&request.location.as_str()) {
        return error(
            AppError::Validation(format!("Unknown location: {}", request.location)),
            revision_id,
        );
    }

    match state.repo.create_found_item(&account, &request).await {
        Ok(item) => {
            if let Err(e) = state.search.index_item(&item).await {
                tracing::warn!("Failed to index found item: {}", e);
            }

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(item, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/found-items/:id/claim - Claim an item. The verification scan
/// runs to completion first; only a passing scan applies any data effects.
pub async fn claim_found_item(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<ClaimResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    // Reject before scanning if the item cannot be claimed at all
    match state.repo.get_found_item(&id).await {
        Ok(Some(item)) => {
            if item.status != FoundStatus::Available {
                return error(
                    AppError::Conflict(format!("Item {} has already been claimed", id)),
                    revision_id,
                );
            }
        }
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Found item {} not found", id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    }

    let timing = ScanTiming {
        tick: state.config.scan_tick,
        success_delay: state.config.scan_success_delay,
    };

    let outcome = verification::run_scan(&ChecksumAuthorizer, &id, timing).await;

    if outcome == ScanOutcome::Reject {
        tracing::info!("Claim verification failed for item {} by {}", id, account.email);
        return success(
            ClaimResponse {
                verified: false,
                item: None,
                matched_lost_item_id: None,
                points_awarded: 0,
            },
            revision_id,
        );
    }

    match state.repo.apply_claim(&id, &account).await {
        Ok(effects) => {
            if let Err(e) = state.search.remove_item(&id).await {
                tracing::warn!("Failed to drop claimed item from index: {}", e);
            }

            tracing::info!(
                "Item {} claimed by {} (matched report: {:?})",
                id,
                account.email,
                effects.matched_lost_item_id
            );

            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(
                ClaimResponse {
                    verified: true,
                    item: Some(effects.item),
                    matched_lost_item_id: effects.matched_lost_item_id,
                    points_awarded: effects.points_awarded,
                },
                new_revision,
            )
        }
        Err(e) => error(e, revision_id),
    }
}
