//! # V1 Admin Key Authentication Middleware
//!
//! Guards the `/admin/*` routes with Bearer token authentication, validated
//! against `SLEUTH_API_KEYS`. Research, history and report routes stay open.
//! Rejections use the v1 `ApiResponse` JSON envelope.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

/// Axum middleware that enforces Bearer token authentication.
///
/// - No keys configured: every request is rejected with 401, so admin routes
///   are locked down until `SLEUTH_API_KEYS` is set.
/// - Missing or malformed `Authorization: Bearer <token>` header: 401.
/// - Unknown token: 401.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.config.server.api_keys.is_empty() {
        return ApiResponse::<()>::error(
            ErrorCode::Unauthorized,
            "API keys not configured. Set SLEUTH_API_KEYS to enable admin access.",
        )
        .into_response();
    }

    let token = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => match header.strip_prefix("Bearer ") {
            Some(token) => token.trim(),
            None => {
                return ApiResponse::<()>::error(
                    ErrorCode::Unauthorized,
                    "Invalid authorization header format. Expected: Bearer <token>",
                )
                .into_response();
            }
        },
        None => {
            return ApiResponse::<()>::error(
                ErrorCode::Unauthorized,
                "Missing authorization header",
            )
            .into_response();
        }
    };

    if state.config.server.api_keys.iter().any(|key| key == token) {
        next.run(request).await
    } else {
        tracing::warn!("Rejected admin request with unknown API key");
        ApiResponse::<()>::error(ErrorCode::Unauthorized, "Invalid API key").into_response()
    }
}
