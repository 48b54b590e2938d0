//! Service booking API endpoints.
//!
//! The provider roster is embedded demo data; bookings are validated and
//! acknowledged, never persisted.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use super::{error, success, ApiResult};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::booking::{self, find_provider, SERVICE_CATEGORIES};
use crate::models::listing::ALL_CATEGORIES;
use crate::models::{BookServiceRequest, BookingAck, ProvidersQuery, ServiceProvider};
use crate::AppState;

/// GET /api/services/providers - Browse maintenance staff with an optional
/// category filter.
pub async fn list_providers(
    State(state): State<AppState>,
    Query(params): Query<ProvidersQuery>,
) -> ApiResult<Vec<ServiceProvider>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if params.category != ALL_CATEGORIES && !SERVICE_CATEGORIES.contains(&params.category.as_str())
    {
        return error(
            AppError::Validation(format!("Unknown service category: {}", params.category)),
            revision_id,
        );
    }

    let providers: Vec<ServiceProvider> = booking::providers()
        .into_iter()
        .filter(|p| params.category == ALL_CATEGORIES || p.category == params.category)
        .collect();

    success(providers, revision_id)
}

/// POST /api/services/bookings - Validate and acknowledge a booking.
pub async fn book_service(
    State(state): State<AppState>,
    CurrentUser(account): CurrentUser,
    Json(request): Json<BookServiceRequest>,
) -> ApiResult<BookingAck> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.date.trim().is_empty()
        || request.time.trim().is_empty()
        || request.description.trim().is_empty()
        || request.location.trim().is_empty()
    {
        return error(
            AppError::Validation("Date, time, description and location are required".to_string()),
            revision_id,
        );
    }

    let Some(provider) = find_provider(&request.provider_id) else {
        return error(
            AppError::NotFound(format!("Service provider {} not found", request.provider_id)),
            revision_id,
        );
    };

    tracing::info!(
        "Booking for {} ({}) submitted by {}",
        provider.name,
        provider.category,
        account.email
    );

    success(
        BookingAck {
            id: uuid::Uuid::new_v4().to_string(),
            provider_id: provider.id,
            provider_name: provider.name,
            date: request.date.trim().to_string(),
            time: request.time.trim().to_string(),
            submitted_at: Utc::now().to_rfc3339(),
        },
        revision_id,
    )
}
