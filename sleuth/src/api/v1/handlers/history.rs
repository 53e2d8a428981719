//! v1 History handlers.

use axum::extract::State;
use axum_extra::extract::Query;

use crate::api::v1::dto::{
    HistoryItemResponse, HistoryQuery, HistoryResponse, ResearchResponse, SimilarResearchQuery,
    SimilarResearchResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode, ResponseMeta};
use crate::api::AppState;

const DEFAULT_HISTORY_LIMIT: u32 = 10;
const DEFAULT_SIMILAR_LIMIT: u32 = 5;

/// `GET /api/v1/history`
#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "history",
    operation_id = "history.list",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Recent research, newest first", body = HistoryResponse),
    )
)]
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResponse<HistoryResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    match state.pipeline.list_history(limit).await {
        Ok(rows) => {
            let research: Vec<HistoryItemResponse> =
                rows.into_iter().map(HistoryItemResponse::from).collect();
            let total = research.len() as u64;
            ApiResponse::success_with_meta(
                HistoryResponse { research },
                ResponseMeta { total: Some(total) },
            )
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/search`
#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "history",
    operation_id = "history.search",
    params(SimilarResearchQuery),
    responses(
        (status = 200, description = "Completed research similar to the query", body = SimilarResearchResponse),
        (status = 400, description = "Empty query", body = ApiError),
    )
)]
pub async fn search_history(
    State(state): State<AppState>,
    Query(query): Query<SimilarResearchQuery>,
) -> ApiResponse<SimilarResearchResponse> {
    if query.query.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Query cannot be empty");
    }

    let limit = query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
    match state.pipeline.find_similar(&query.query, limit).await {
        Ok(records) => ApiResponse::success(SimilarResearchResponse {
            results: records.into_iter().map(ResearchResponse::from).collect(),
        }),
        Err(e) => e.into(),
    }
}
