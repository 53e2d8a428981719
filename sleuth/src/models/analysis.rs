use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence used when the model does not report a usable one.
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub detailed_analysis: DetailedAnalysis,
    pub confidence_score: f32,
    pub sources_used: usize,
    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DetailedAnalysis {
    Text(String),
    Sections(Vec<AnalysisSection>),
}

impl Default for DetailedAnalysis {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl DetailedAnalysis {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Sections(sections) => sections.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisSection {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    ModelReported,
    #[default]
    Fallback,
}

impl std::fmt::Display for ConfidenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelReported => write!(f, "model_reported"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisMetadata {
    pub model: String,
    pub generated_at: DateTime<Utc>,
    /// Characters sent to the model after truncation.
    pub context_length: usize,
    pub original_context_length: usize,
    pub context_truncated: bool,
    /// Depth level actually applied, after out-of-range fallback.
    pub depth: u8,
    pub confidence_source: ConfidenceSource,
}
