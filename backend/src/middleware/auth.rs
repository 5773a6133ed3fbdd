//! Authentication middleware
//!
//! Validates bearer JWTs issued by the auth service and exposes the tenant
//! scope (restaurant + outlet) to handlers via the CurrentUser extractor.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorResponse;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
    pub restaurant_id: uuid::Uuid,
    pub outlet_id: uuid::Uuid,
}

/// Authentication middleware that validates JWT tokens
/// Note: The token is validated inline against the shared secret to avoid
/// state dependency issues in route-layer middleware.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    // Get JWT secret from environment (fallback for middleware without state)
    let jwt_secret = std::env::var("POS__JWT__SECRET")
        .or_else(|_| std::env::var("POS_JWT_SECRET"))
        .unwrap_or_else(|_| "development-secret-key".to_string());

    let claims = match decode_jwt(token, &jwt_secret) {
        Ok(claims) => claims,
        Err(err) => {
            return err.into_response();
        }
    };

    // Parse UUIDs from claims
    let user_id = match uuid::Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    let restaurant_id = match uuid::Uuid::parse_str(&claims.restaurant_id) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid restaurant ID in token"),
    };

    let outlet_id = match uuid::Uuid::parse_str(&claims.outlet_id) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid outlet ID in token"),
    };

    let auth_user = AuthUser {
        user_id,
        restaurant_id,
        outlet_id,
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// JWT claims structure
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    sub: String,
    restaurant_id: String,
    outlet_id: String,
    exp: i64,
    iat: i64,
}

/// Decode and validate JWT token
fn decode_jwt(token: &str, secret: &str) -> Result<Claims, crate::error::AppError> {
    use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => crate::error::AppError::TokenExpired,
        _ => crate::error::AppError::InvalidToken,
    })
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: crate::error::ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
            field: None,
        },
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user and tenant scope
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                let error = ErrorResponse {
                    error: crate::error::ErrorDetail {
                        code: "UNAUTHORIZED".to_string(),
                        message: "Authentication required".to_string(),
                        field: None,
                    },
                };
                (StatusCode::UNAUTHORIZED, Json(error))
            })
    }
}
