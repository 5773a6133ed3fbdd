//! Internal-token guard for service-to-service routes
//!
//! The order service calls consumption and cost-snapshot endpoints with a
//! shared-secret X-Internal-Token header instead of a user JWT.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use crate::error::AppError;

const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Guard middleware for /internal routes
pub async fn internal_auth_middleware(request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    let Some(provided) = provided else {
        return AppError::Unauthorized("Missing internal service token".to_string())
            .into_response();
    };

    // Fallback for route-layer middleware without state, mirroring the JWT
    // secret lookup
    let expected = std::env::var("POS__INTERNAL__TOKEN")
        .or_else(|_| std::env::var("POS_INTERNAL_TOKEN"))
        .unwrap_or_else(|_| "development-internal-token".to_string());

    if !tokens_match(provided, &expected) {
        return AppError::Unauthorized("Invalid internal service token".to_string())
            .into_response();
    }

    next.run(request).await
}

/// Compare digests rather than raw strings so the comparison cost does not
/// depend on the position of the first mismatching byte.
fn tokens_match(provided: &str, expected: &str) -> bool {
    Sha256::digest(provided.as_bytes()) == Sha256::digest(expected.as_bytes())
}
