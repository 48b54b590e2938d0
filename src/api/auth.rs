//! Authentication API endpoints.

use axum::{extract::State, http::HeaderMap, Json};

use super::{error, success, ApiResult};
use crate::auth::{self, CurrentUser};
use crate::errors::AppError;
use crate::models::{LoginRequest, RegisterRequest, SessionResponse, User};
use crate::AppState;

/// POST /api/auth/register - Create an account and start a session.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<SessionResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.email.trim().is_empty() || !request.email.contains('@') {
        return error(
            AppError::Validation("A valid email is required".to_string()),
            revision_id,
        );
    }
    if request.password.is_empty() {
        return error(
            AppError::Validation("Password is required".to_string()),
            revision_id,
        );
    }
    if request.name.trim().is_empty() {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    }

    let password_hash = auth::hash_password(&request.password);

    let account = match state
        .repo
        .create_account(
            request.email.trim(),
            request.name.trim(),
            request.role.into(),
            request.room_number.clone(),
            &password_hash,
        )
        .await
    {
        Ok(account) => account,
        Err(e) => return error(e, revision_id),
    };

    let token = match state.repo.create_session(&account.id).await {
        Ok(token) => token,
        Err(e) => return error(e, revision_id),
    };

    tracing::info!("Registered {} account for {}", account.role.as_str(), account.email);

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    success(
        SessionResponse {
            token,
            user: account.to_public(),
        },
        new_revision,
    )
}

/// POST /api/auth/login - Exchange credentials for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<SessionResponse> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let account = match state.repo.find_account_by_email(request.email.trim()).await {
        Ok(account) => account,
        Err(e) => return error(e, revision_id),
    };

    // Same error for unknown email and wrong password
    let Some(account) = account else {
        return error(
            AppError::Unauthorized("Invalid credentials".to_string()),
            revision_id,
        );
    };
    if !auth::verify_password(&request.password, &account.password_hash) {
        return error(
            AppError::Unauthorized("Invalid credentials".to_string()),
            revision_id,
        );
    }

    let token = match state.repo.create_session(&account.id).await {
        Ok(token) => token,
        Err(e) => return error(e, revision_id),
    };

    success(
        SessionResponse {
            token,
            user: account.to_public(),
        },
        revision_id,
    )
}

/// POST /api/auth/logout - Tear down the current session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Some(token) = auth::extract_token(&headers) {
        if let Err(e) = state.repo.delete_session(&token).await {
            return error(e, revision_id);
        }
    }

    success((), revision_id)
}

/// GET /api/auth/me - The authenticated profile, re-read from the store so
/// point awards are always reflected.
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
) -> ApiResult<User> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.get_account(&account.id).await {
        Ok(Some(fresh)) => success(fresh.to_public(), revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("User {} not found", account.id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}
