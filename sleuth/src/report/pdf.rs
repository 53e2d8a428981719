use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use genpdf::elements::{Break, PageBreak, Paragraph};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, SimplePageDecorator};

use crate::config::ReportsConfig;
use crate::error::{Result, SleuthError};
use crate::models::ResearchRecord;
use crate::report::{ReportBlock, ReportLayout, ReportRenderer};

/// genpdf-backed renderer writing `report_{id}_{YYYYmmdd_HHMMSS}.pdf` files.
#[derive(Debug, Clone)]
pub struct PdfReportRenderer {
    output_dir: PathBuf,
    font_dir: PathBuf,
    font_family: String,
}

impl PdfReportRenderer {
    pub fn new(config: &ReportsConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.path),
            font_dir: PathBuf::from(&config.font_dir),
            font_family: config.font_family.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_pdf(&self, layout: &ReportLayout, path: &Path) -> Result<()> {
        let font_family = genpdf::fonts::from_files(&self.font_dir, &self.font_family, None)
            .map_err(|e| {
                SleuthError::Report(format!(
                    "Failed to load font family '{}' from {}: {e}",
                    self.font_family,
                    self.font_dir.display()
                ))
            })?;

        let mut doc = Document::new(font_family);
        doc.set_title(layout.title.clone());

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(20);
        doc.set_page_decorator(decorator);

        for block in &layout.blocks {
            match block {
                ReportBlock::Title(text) => {
                    doc.push(Paragraph::new(StyledString::new(
                        text.clone(),
                        Style::new().bold().with_font_size(20),
                    )));
                    doc.push(Break::new(0.5));
                }
                ReportBlock::Meta(text) => {
                    doc.push(Paragraph::new(StyledString::new(
                        text.clone(),
                        Style::new().italic().with_font_size(9),
                    )));
                    doc.push(Break::new(1));
                }
                ReportBlock::Heading(text) => {
                    doc.push(Break::new(0.5));
                    doc.push(Paragraph::new(StyledString::new(
                        text.clone(),
                        Style::new().bold().with_font_size(15),
                    )));
                    doc.push(Break::new(0.3));
                }
                ReportBlock::Subheading(text) => {
                    doc.push(Paragraph::new(StyledString::new(
                        text.clone(),
                        Style::new().bold().with_font_size(12),
                    )));
                }
                ReportBlock::Paragraph(text) => {
                    doc.push(Paragraph::new(text.clone()));
                    doc.push(Break::new(0.3));
                }
                ReportBlock::Numbered { number, text } => {
                    doc.push(Paragraph::new(format!("{number}. {text}")));
                }
                ReportBlock::PageBreak => doc.push(PageBreak::new()),
            }
        }

        doc.render_to_file(path)
            .map_err(|e| SleuthError::Report(format!("Failed to render PDF: {e}")))
    }
}

#[async_trait]
impl ReportRenderer for PdfReportRenderer {
    async fn render(
        &self,
        record: &ResearchRecord,
        include_sources: bool,
        report_id: &str,
    ) -> Result<PathBuf> {
        let now = Utc::now();
        let layout = ReportLayout::from_record(record, include_sources, now)?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let file_name = format!("report_{report_id}_{}.pdf", now.format("%Y%m%d_%H%M%S"));
        let path = self.output_dir.join(file_name);

        let renderer = self.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || renderer.write_pdf(&layout, &target))
            .await
            .map_err(|e| SleuthError::Internal(format!("Report task failed: {e}")))??;

        tracing::info!(
            research_id = %record.id,
            report_id,
            path = %path.display(),
            include_sources,
            "Report rendered"
        );
        Ok(path)
    }
}
