//! v1 Research handlers.

use axum::extract::{Path, State};
use validator::Validate;

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{CreateResearchRequest, ResearchResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `POST /api/v1/research`
///
/// Runs search, analysis and persistence before responding. A failed run
/// returns the persisted failed record in `data` next to the `error`.
#[utoipa::path(
    post,
    path = "/api/v1/research",
    tag = "research",
    operation_id = "research.create",
    request_body = CreateResearchRequest,
    responses(
        (status = 201, description = "Research completed", body = ResearchResponse),
        (status = 400, description = "Invalid topic", body = ApiError),
        (status = 502, description = "Search or analysis failed; failed record in data", body = ApiError),
        (status = 500, description = "Result could not be persisted", body = ApiError),
    )
)]
pub async fn create_research(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateResearchRequest>,
) -> ApiResponse<ResearchResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, e.to_string());
    }

    let depth = req.depth.unwrap_or(state.config.analysis.default_depth);
    let max_results = req
        .max_results
        .unwrap_or(state.config.search.default_max_results);
    let cancel = state.shutdown.child_token();

    match state
        .pipeline
        .start_research(&req.topic, depth, max_results, &cancel)
        .await
    {
        Ok(record) => ApiResponse::created(ResearchResponse::from(record)),
        Err(failure) => {
            let (code, message) = ErrorCode::classify(&failure.error);
            tracing::debug!(stage = %failure.stage, %code, "Research request failed");
            match failure.record {
                Some(record) => {
                    ApiResponse::error_with_data(ResearchResponse::from(*record), code, message)
                }
                None => ApiResponse::error(code, message),
            }
        }
    }
}

/// `GET /api/v1/research/{researchId}`
#[utoipa::path(
    get,
    path = "/api/v1/research/{researchId}",
    tag = "research",
    operation_id = "research.get",
    params(("researchId" = String, Path, description = "Research ID")),
    responses(
        (status = 200, description = "Research found", body = ResearchResponse),
        (status = 404, description = "Research not found", body = ApiError),
    )
)]
pub async fn get_research(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<ResearchResponse> {
    match state.pipeline.get_research(&id).await {
        Ok(record) => ApiResponse::success(ResearchResponse::from(record)),
        Err(e) => e.into(),
    }
}
