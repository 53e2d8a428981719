//! Report DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::GeneratedReport;

/// Request body for `POST /v1/reports`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub research_id: String,
    /// Append a numbered source list on a new page. Defaults to true.
    pub include_sources: Option<bool>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report_id: String,
    pub research_id: String,
    pub file_name: String,
    pub path: String,
    /// Relative URL served by `GET /api/v1/downloads/{fileName}`.
    pub download_url: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<GeneratedReport> for ReportResponse {
    fn from(report: GeneratedReport) -> Self {
        Self {
            download_url: format!("/api/v1/downloads/{}", report.file_name),
            report_id: report.report_id,
            research_id: report.research_id,
            path: report.path.display().to_string(),
            file_name: report.file_name,
            created_at: report.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_uses_file_name() {
        let resp = ReportResponse::from(GeneratedReport {
            report_id: "rpt_1".to_string(),
            research_id: "res_1".to_string(),
            file_name: "report_rpt_1_20260101_120000.pdf".to_string(),
            path: "./reports/report_rpt_1_20260101_120000.pdf".into(),
            created_at: Utc::now(),
        });
        let json = serde_json::to_value(&resp).expect("serialize");
        assert_eq!(
            json["downloadUrl"],
            "/api/v1/downloads/report_rpt_1_20260101_120000.pdf"
        );
        assert_eq!(json["reportId"], "rpt_1");
    }
}
