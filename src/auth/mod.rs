//! Session-token authentication module.
//!
//! Login exchanges credentials for an opaque bearer token; the [`CurrentUser`]
//! extractor resolves that token to an account on every protected request.
//! Credential digests are compared constant-time to mitigate timing attacks.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorDetails, ErrorResponse};
use crate::models::UserAccount;
use crate::AppState;

/// Header name for the session token.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// The authenticated account behind the request's session token.
///
/// Extracting this from a request without a valid token short-circuits the
/// handler with a 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserAccount);

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Check a password against a stored digest in constant time.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let computed = hash_password(password);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

/// Pull the session token from the request headers: the session header
/// first, then an Authorization bearer token.
pub fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(|s| s.to_string())
        })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_token(&parts.headers) else {
            return Err(unauthorized_response("Missing session token"));
        };

        match state.repo.get_session_user(&token).await {
            Ok(Some(account)) => Ok(CurrentUser(account)),
            Ok(None) => Err(unauthorized_response("Invalid or expired session")),
            Err(e) => {
                tracing::error!("Session lookup failed: {}", e);
                Err(unauthorized_response("Invalid or expired session"))
            }
        }
    }
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
            details: None,
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
