//! Bearer-token gate for admin endpoints.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::config::Config;
use crate::error::ApiError;

/// Checks the `Authorization: Bearer <token>` header against the configured
/// admin token. With no token configured, admin endpoints are disabled
/// entirely rather than left open.
pub fn require_admin(headers: &HeaderMap, config: &Config) -> Result<(), ApiError> {
    let Some(expected) = config.admin_token.as_deref() else {
        return Err(ApiError::Unauthorized);
    };

    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}
