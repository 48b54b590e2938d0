//! Lost item report API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::db::POINTS_FOR_REPORT;
use crate::errors::AppError;
use crate::models::{
    LostItemReport, ReportLostItemRequest, ReportLostItemResponse, Role, UpdateLostStatusRequest,
    LOCATIONS,
};
use crate::AppState;

/// POST /api/lost-items - Report a lost item. Students earn green points for
/// filing a report.
pub async fn report_lost_item(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Json(request): Json<ReportLostItemRequest>,
) -> ApiResult<ReportLostItemResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.name.trim().is_empty()
        || request.description.trim().is_empty()
        || request.location.trim().is_empty()
        || request.date_lost.trim().is_empty()
    {
        return error(
            AppError::Validation("Name, description, location and date lost are required".to_string()),
            revision_id,
        );
    }
    if !LOCATIONS.contains(&request.location.as_str()) {
        return error(
            AppError::Validation(format!("Unknown location: {}", request.location)),
            revision_id,
        );
    }

    let report = match state.repo.create_lost_item(&account, &request).await {
        Ok(report) => report,
        Err(e) => return error(e, revision_id),
    };

    let mut points_awarded = 0;
    if account.role == Role::Student {
        match state.repo.award_points(&account.id, POINTS_FOR_REPORT).await {
            Ok(_) => points_awarded = POINTS_FOR_REPORT,
            Err(e) => {
                tracing::warn!("Failed to award report points to {}: {}", account.id, e);
            }
        }
    }

    tracing::info!("Lost item {} reported by {}", report.id, account.email);

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    success(
        ReportLostItemResponse {
            report,
            points_awarded,
        },
        new_revision,
    )
}

/// GET /api/lost-items - The caller's reports; staff and admins see all.
pub async fn list_lost_items(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> ApiResult<Vec<LostItemReport>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let result = match account.role {
        Role::Student => state.repo.list_lost_items_for_user(&account.id).await,
        Role::Staff | Role::Admin => state.repo.list_lost_items().await,
    };

    match result {
        Ok(reports) => success(reports, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/lost-items/:id/status - Advance a report's status (staff and
/// admins only). Reverse transitions are rejected.
pub async fn update_lost_status(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateLostStatusRequest>,
) -> ApiResult<LostItemReport> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if account.role == Role::Student {
        return error(
            AppError::Forbidden("Only staff can update report status".to_string()),
            revision_id,
        );
    }

    match state.repo.advance_lost_status(&id, request.status).await {
        Ok(report) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(report, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/lost-items/:id - Get a single report. Students may only read
/// their own.
pub async fn get_lost_item(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<LostItemReport> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_lost_item(&id).await {
        Ok(Some(report)) => {
            if account.role == Role::Student && report.user_id != account.id {
                return error(
                    AppError::Forbidden("Not your report".to_string()),
                    revision_id,
                );
            }
            success(report, revision_id)
        }
        Ok(None) => error(
            AppError::NotFound(format!("Lost item {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}
