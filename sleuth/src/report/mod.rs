mod layout;
mod pdf;
mod service;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ResearchRecord;

pub use layout::{ReportBlock, ReportLayout};
pub use pdf::PdfReportRenderer;
pub use service::{GeneratedReport, ReportService};

/// Renders a completed research record to a file and returns its path.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    async fn render(
        &self,
        record: &ResearchRecord,
        include_sources: bool,
        report_id: &str,
    ) -> Result<PathBuf>;
}
