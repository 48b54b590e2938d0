//! Datastore API endpoints (admin dashboard).

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::{Datastore, RevisionInfo, Role};
use crate::AppState;

/// GET /api/datastore - Full collection snapshot, admin only.
pub async fn get_datastore(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> ApiResult<Datastore> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if account.role != Role::Admin {
        return error(
            AppError::Forbidden("Admin access required".to_string()),
            revision_id,
        );
    }

    match state.repo.get_datastore().await {
        Ok(datastore) => success(datastore, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/datastore/revision - Current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_revision_info().await {
        Ok(info) => success(info, revision_id),
        Err(e) => error(e, revision_id),
    }
}
