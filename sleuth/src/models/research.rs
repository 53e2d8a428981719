use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AnalysisResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for ResearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ResearchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown research status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchRecord {
    pub id: String,
    pub topic: String,
    pub status: ResearchStatus,
    pub depth: u8,
    pub analysis: Option<AnalysisResult>,
    pub sources: Vec<String>,
    pub error: Option<String>,
    pub duration_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResearchRecord {
    pub fn new(id: String, topic: String, depth: u8) -> Self {
        let now = Utc::now();
        Self {
            id,
            topic,
            status: ResearchStatus::Pending,
            depth,
            analysis: None,
            sources: Vec::new(),
            error: None,
            duration_ms: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn complete(&mut self, analysis: AnalysisResult) {
        self.analysis = Some(analysis);
        self.error = None;
        self.status = ResearchStatus::Completed;
        self.updated_at = Utc::now();
    }

    /// Marks the run failed. Analysis is cleared, sources gathered so far are kept.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.analysis = None;
        self.error = Some(error.into());
        self.status = ResearchStatus::Failed;
        self.updated_at = Utc::now();
    }

    pub fn is_completed(&self) -> bool {
        self.status == ResearchStatus::Completed
    }

    pub fn summary(&self) -> ResearchSummary {
        ResearchSummary {
            id: self.id.clone(),
            topic: self.topic.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// History listing row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchSummary {
    pub id: String,
    pub topic: String,
    pub status: ResearchStatus,
    pub created_at: DateTime<Utc>,
}

fn prefixed_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &hex[..12])
}

pub fn new_research_id() -> String {
    prefixed_id("res")
}

pub fn new_report_id() -> String {
    prefixed_id("rpt")
}
