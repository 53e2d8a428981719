//! v1 Admin handlers.

use axum::extract::State;

use crate::api::v1::dto::{CacheClearedResponse, CacheStatsResponse};
use crate::api::v1::response::ApiResponse;
use crate::api::AppState;

/// `GET /api/v1/admin/cache`
#[utoipa::path(
    get,
    path = "/api/v1/admin/cache",
    tag = "admin",
    responses(
        (status = 200, description = "Fingerprint cache counters", body = CacheStatsResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn cache_stats(State(state): State<AppState>) -> ApiResponse<CacheStatsResponse> {
    ApiResponse::success(CacheStatsResponse::new(
        state.pipeline.cache_stats(),
        state.config.cache.ttl_secs,
    ))
}

/// `DELETE /api/v1/admin/cache`
#[utoipa::path(
    delete,
    path = "/api/v1/admin/cache",
    tag = "admin",
    responses(
        (status = 200, description = "Search cache cleared", body = CacheClearedResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_cache(State(state): State<AppState>) -> ApiResponse<CacheClearedResponse> {
    let entries_cleared = state.pipeline.cache_stats().entries;
    state.pipeline.clear_cache();
    tracing::info!(entries_cleared, "Search cache cleared");

    ApiResponse::success(CacheClearedResponse { entries_cleared })
}

#[cfg(test)]
mod tests {
    use crate::api::v1::dto::CacheClearedResponse;

    #[test]
    fn cache_cleared_response_serializes_camel_case() {
        let resp = CacheClearedResponse { entries_cleared: 4 };
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(json["entriesCleared"], 4);
    }
}
