//! Research request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{AnalysisMetadata, ResearchRecord};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/research`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResearchRequest {
    /// Research topic, 3 to 500 characters after trimming.
    #[validate(length(min = 1, max = 500))]
    pub topic: String,
    /// Analysis depth 1..=5. Out-of-range values fall back to 3.
    pub depth: Option<u32>,
    /// Evidence results to gather, clamped to 1..=20. Defaults to 10.
    pub max_results: Option<u32>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadataResponse {
    pub model: String,
    #[schema(value_type = String)]
    pub generated_at: DateTime<Utc>,
    pub context_length: usize,
    pub original_context_length: usize,
    pub context_truncated: bool,
    pub depth: u8,
    /// `model_reported` or `fallback`.
    pub confidence_source: String,
}

impl From<AnalysisMetadata> for AnalysisMetadataResponse {
    fn from(meta: AnalysisMetadata) -> Self {
        Self {
            model: meta.model,
            generated_at: meta.generated_at,
            context_length: meta.context_length,
            original_context_length: meta.original_context_length,
            context_truncated: meta.context_truncated,
            depth: meta.depth,
            confidence_source: meta.confidence_source.to_string(),
        }
    }
}

/// Full research record.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResponse {
    pub id: String,
    pub topic: String,
    /// `pending`, `completed` or `failed`.
    pub status: String,
    pub depth: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub key_findings: Vec<String>,
    /// Free text, or an ordered list of `{title, body}` sections.
    #[schema(value_type = Object)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f32>,
    pub sources_used: usize,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnalysisMetadataResponse>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<ResearchRecord> for ResearchResponse {
    fn from(record: ResearchRecord) -> Self {
        let (summary, key_findings, detailed_analysis, confidence_score, sources_used, metadata) =
            match record.analysis {
                Some(analysis) => (
                    Some(analysis.summary),
                    analysis.key_findings,
                    serde_json::to_value(&analysis.detailed_analysis).ok(),
                    Some(analysis.confidence_score),
                    analysis.sources_used,
                    Some(analysis.metadata.into()),
                ),
                None => (None, Vec::new(), None, None, 0, None),
            };

        Self {
            id: record.id,
            topic: record.topic,
            status: record.status.to_string(),
            depth: record.depth,
            summary,
            key_findings,
            detailed_analysis,
            confidence_score,
            sources_used,
            sources: record.sources,
            error: record.error,
            duration_ms: record.duration_ms,
            metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
