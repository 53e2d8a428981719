use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sleuth API",
        version = "1.0.0",
        description = "Self-hostable research agent. Web evidence search, LLM synthesis, research history and PDF reports.",
    ),
    paths(
        handlers::health::health_check,
        handlers::research::create_research,
        handlers::research::get_research,
        handlers::history::list_history,
        handlers::history::search_history,
        handlers::reports::create_report,
        handlers::reports::download_report,
        handlers::admin::cache_stats,
        handlers::admin::clear_cache,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Research
        dto::research::CreateResearchRequest,
        dto::research::ResearchResponse,
        dto::research::AnalysisMetadataResponse,
        // History
        dto::history::HistoryQuery,
        dto::history::SimilarResearchQuery,
        dto::history::HistoryItemResponse,
        dto::history::HistoryResponse,
        dto::history::SimilarResearchResponse,
        // Reports
        dto::reports::CreateReportRequest,
        dto::reports::ReportResponse,
        // Admin
        dto::admin::CacheStatsResponse,
        dto::admin::CacheClearedResponse,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::SearchStatus,
        handlers::health::LlmStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "research", description = "Run and fetch research"),
        (name = "history", description = "Research history and similarity lookup"),
        (name = "reports", description = "PDF report generation and download"),
        (name = "admin", description = "Administrative operations (auth required)"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
