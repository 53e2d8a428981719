use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;
use crate::llm::LlmBackend;

/// Health data returned inside the v1 envelope.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub database: DatabaseStatus,
    pub search: SearchStatus,
    pub llm: LlmStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DatabaseStatus {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchStatus {
    pub status: String,
    pub cache_entries: usize,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let db_status = match state.pipeline.history().health().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "History store health check failed");
            "error"
        }
    };

    let search_status = SearchStatus {
        status: if state.config.search.api_key.is_some() {
            "configured".to_string()
        } else {
            "unconfigured".to_string()
        },
        cache_entries: state.pipeline.cache_stats().entries,
    };

    let llm_status = if state.llm.is_available() {
        let provider = match state.llm.backend() {
            LlmBackend::OpenAI => "openai",
            LlmBackend::OpenRouter => "openrouter",
            LlmBackend::Ollama => "ollama",
            LlmBackend::LmStudio => "lmstudio",
            LlmBackend::Gemini => "gemini",
            LlmBackend::OpenAICompatible { .. } => "openai-compatible",
            LlmBackend::Unavailable { .. } => "unavailable",
        };
        LlmStatus {
            status: "available".to_string(),
            provider: Some(provider.to_string()),
            model: Some(state.pipeline.model_id().to_string()),
        }
    } else {
        LlmStatus {
            status: "unavailable".to_string(),
            provider: None,
            model: None,
        }
    };

    let overall = if db_status == "ok" { "ok" } else { "degraded" };

    ApiResponse::success(HealthData {
        status: overall.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseStatus {
            status: db_status.to_string(),
        },
        search: search_status,
        llm: llm_status,
    })
}
