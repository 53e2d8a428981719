//! History and similarity lookup DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::research::ResearchResponse;
use crate::models::ResearchSummary;

/// Query parameters for `GET /v1/history`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Maximum rows to return (default 10, max 100).
    pub limit: Option<u32>,
}

/// Query parameters for `GET /v1/search`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SimilarResearchQuery {
    /// Free-text query matched against stored topics and summaries.
    pub query: String,
    /// Maximum matches to return (default 5, max 100).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItemResponse {
    pub id: String,
    pub topic: String,
    pub status: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<ResearchSummary> for HistoryItemResponse {
    fn from(summary: ResearchSummary) -> Self {
        Self {
            id: summary.id,
            topic: summary.topic,
            status: summary.status.to_string(),
            created_at: summary.created_at,
        }
    }
}

/// Response for `GET /v1/history`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    /// Most recent first.
    pub research: Vec<HistoryItemResponse>,
}

/// Response for `GET /v1/search`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimilarResearchResponse {
    /// Most relevant first.
    pub results: Vec<ResearchResponse>,
}
