use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, SleuthError};
use crate::history::HistoryStore;
use crate::models::new_report_id;
use crate::report::ReportRenderer;

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub report_id: String,
    pub research_id: String,
    pub file_name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Looks up stored research and hands it to the renderer.
pub struct ReportService {
    history: Arc<dyn HistoryStore>,
    renderer: Arc<dyn ReportRenderer>,
    reports_dir: PathBuf,
}

impl ReportService {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        renderer: Arc<dyn ReportRenderer>,
        reports_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            history,
            renderer,
            reports_dir: reports_dir.into(),
        }
    }

    pub async fn generate(
        &self,
        research_id: &str,
        include_sources: bool,
    ) -> Result<GeneratedReport> {
        let record = self
            .history
            .get(research_id)
            .await?
            .ok_or_else(|| SleuthError::NotFound(format!("Research {research_id} not found")))?;

        if !record.is_completed() {
            return Err(SleuthError::Validation(format!(
                "Research {research_id} is {} and cannot be rendered",
                record.status
            )));
        }

        let report_id = new_report_id();
        let path = self
            .renderer
            .render(&record, include_sources, &report_id)
            .await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| SleuthError::Report("Renderer returned an unnamed path".to_string()))?;

        Ok(GeneratedReport {
            report_id,
            research_id: record.id,
            file_name,
            path,
            created_at: Utc::now(),
        })
    }

    /// Resolve a report file name inside the reports directory.
    ///
    /// Only bare `*.pdf` names are accepted; separators and `..` are rejected.
    pub fn resolve_download(&self, file_name: &str) -> Result<PathBuf> {
        let is_bare_name = !file_name.is_empty()
            && Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name)
            && !file_name.contains(['/', '\\'])
            && !file_name.contains("..");

        if !is_bare_name || !file_name.ends_with(".pdf") {
            return Err(SleuthError::Validation(format!(
                "Invalid report file name: {file_name}"
            )));
        }

        let path = self.reports_dir.join(file_name);
        if !path.is_file() {
            return Err(SleuthError::NotFound(format!("Report {file_name} not found")));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoHistory;

    #[async_trait::async_trait]
    impl HistoryStore for NoHistory {
        async fn save(&self, _: &crate::models::ResearchRecord) -> Result<()> {
            Ok(())
        }
        async fn get(&self, _: &str) -> Result<Option<crate::models::ResearchRecord>> {
            Ok(None)
        }
        async fn list(&self, _: u32) -> Result<Vec<crate::models::ResearchSummary>> {
            Ok(vec![])
        }
        async fn similarity_search(
            &self,
            _: &str,
            _: u32,
        ) -> Result<Vec<crate::models::ResearchRecord>> {
            Ok(vec![])
        }
        async fn health(&self) -> Result<()> {
            Ok(())
        }
    }

    struct NoRenderer;

    #[async_trait::async_trait]
    impl ReportRenderer for NoRenderer {
        async fn render(
            &self,
            _: &crate::models::ResearchRecord,
            _: bool,
            _: &str,
        ) -> Result<PathBuf> {
            Err(SleuthError::Report("unused".to_string()))
        }
    }

    fn service(dir: &Path) -> ReportService {
        ReportService::new(Arc::new(NoHistory), Arc::new(NoRenderer), dir)
    }

    #[test]
    fn test_resolve_download_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        for name in ["../secret.pdf", "a/b.pdf", "..\\x.pdf", "", "report.txt", ".."] {
            assert!(
                matches!(
                    service.resolve_download(name),
                    Err(SleuthError::Validation(_))
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_download_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report_rpt_1_20260101_000000.pdf"), b"%PDF").unwrap();
        let service = service(dir.path());

        let path = service
            .resolve_download("report_rpt_1_20260101_000000.pdf")
            .unwrap();
        assert!(path.starts_with(dir.path()));

        assert!(matches!(
            service.resolve_download("missing.pdf"),
            Err(SleuthError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_unknown_research_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = service(dir.path())
            .generate("res_missing", true)
            .await
            .unwrap_err();
        assert!(matches!(err, SleuthError::NotFound(_)));
    }
}
