use chrono::{DateTime, Utc};

use crate::error::{Result, SleuthError};
use crate::models::{DetailedAnalysis, ResearchRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum ReportBlock {
    Title(String),
    Meta(String),
    Heading(String),
    Subheading(String),
    Paragraph(String),
    Numbered { number: usize, text: String },
    PageBreak,
}

/// Renderer-independent report structure, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub blocks: Vec<ReportBlock>,
}

impl ReportLayout {
    pub fn from_record(
        record: &ResearchRecord,
        include_sources: bool,
        generated_at: DateTime<Utc>,
    ) -> Result<Self> {
        let analysis = match (&record.analysis, record.is_completed()) {
            (Some(analysis), true) => analysis,
            _ => {
                return Err(SleuthError::Validation(format!(
                    "Research {} is {} and cannot be rendered",
                    record.id, record.status
                )))
            }
        };

        let mut blocks = vec![
            ReportBlock::Title(record.topic.clone()),
            ReportBlock::Meta(format!(
                "Generated: {} | Research ID: {}",
                generated_at.format("%B %d, %Y at %H:%M UTC"),
                record.id
            )),
            ReportBlock::Heading("Executive Summary".to_string()),
        ];
        blocks.extend(paragraphs(&analysis.summary));

        if !analysis.key_findings.is_empty() {
            blocks.push(ReportBlock::Heading("Key Findings".to_string()));
            blocks.extend(
                analysis
                    .key_findings
                    .iter()
                    .enumerate()
                    .map(|(index, finding)| ReportBlock::Numbered {
                        number: index + 1,
                        text: finding.clone(),
                    }),
            );
        }

        if !analysis.detailed_analysis.is_empty() {
            blocks.push(ReportBlock::Heading("Detailed Analysis".to_string()));
            match &analysis.detailed_analysis {
                DetailedAnalysis::Text(text) => blocks.extend(paragraphs(text)),
                DetailedAnalysis::Sections(sections) => {
                    for section in sections {
                        blocks.push(ReportBlock::Subheading(section.title.clone()));
                        blocks.extend(paragraphs(&section.body));
                    }
                }
            }
        }

        if include_sources && !record.sources.is_empty() {
            blocks.push(ReportBlock::PageBreak);
            blocks.push(ReportBlock::Heading("Sources & References".to_string()));
            blocks.extend(
                record
                    .sources
                    .iter()
                    .enumerate()
                    .map(|(index, source)| ReportBlock::Numbered {
                        number: index + 1,
                        text: source.clone(),
                    }),
            );
        }

        Ok(Self {
            title: record.topic.clone(),
            blocks,
        })
    }
}

fn paragraphs(text: &str) -> impl Iterator<Item = ReportBlock> + '_ {
    text.split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| ReportBlock::Paragraph(paragraph.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnalysisMetadata, AnalysisResult, AnalysisSection, ConfidenceSource, ResearchStatus,
    };
    use pretty_assertions::assert_eq;

    fn record(detailed: DetailedAnalysis, sources: Vec<&str>) -> ResearchRecord {
        let mut record = ResearchRecord::new("res_abc".to_string(), "Topic".to_string(), 3);
        record.sources = sources.into_iter().map(String::from).collect();
        record.complete(AnalysisResult {
            summary: "Para one.\n\nPara two.".to_string(),
            key_findings: vec!["B first".to_string(), "A second".to_string()],
            detailed_analysis: detailed,
            confidence_score: 0.8,
            sources_used: 2,
            metadata: AnalysisMetadata {
                model: "m".to_string(),
                generated_at: Utc::now(),
                context_length: 0,
                original_context_length: 0,
                context_truncated: false,
                depth: 3,
                confidence_source: ConfidenceSource::ModelReported,
            },
        });
        record
    }

    fn headings(layout: &ReportLayout) -> Vec<&str> {
        layout
            .blocks
            .iter()
            .filter_map(|block| match block {
                ReportBlock::Heading(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_layout_order_with_sources() {
        let layout = ReportLayout::from_record(
            &record(
                DetailedAnalysis::Sections(vec![
                    AnalysisSection {
                        title: "Zeta".to_string(),
                        body: "z".to_string(),
                    },
                    AnalysisSection {
                        title: "Alpha".to_string(),
                        body: "a".to_string(),
                    },
                ]),
                vec!["https://one", "https://two"],
            ),
            true,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(layout.blocks[0], ReportBlock::Title("Topic".to_string()));
        assert!(matches!(&layout.blocks[1], ReportBlock::Meta(meta) if meta.contains("res_abc")));
        assert_eq!(
            headings(&layout),
            vec![
                "Executive Summary",
                "Key Findings",
                "Detailed Analysis",
                "Sources & References"
            ]
        );

        let findings: Vec<_> = layout
            .blocks
            .iter()
            .filter_map(|block| match block {
                ReportBlock::Numbered { number, text } if text.contains(' ') => {
                    Some((*number, text.as_str()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(findings, vec![(1, "B first"), (2, "A second")]);

        let subheadings: Vec<_> = layout
            .blocks
            .iter()
            .filter_map(|block| match block {
                ReportBlock::Subheading(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(subheadings, vec!["Zeta", "Alpha"]);

        let page_break = layout
            .blocks
            .iter()
            .position(|b| *b == ReportBlock::PageBreak)
            .expect("sources start on a new page");
        assert_eq!(
            layout.blocks[page_break + 1],
            ReportBlock::Heading("Sources & References".to_string())
        );
        assert_eq!(
            layout.blocks.last(),
            Some(&ReportBlock::Numbered {
                number: 2,
                text: "https://two".to_string()
            })
        );
    }

    #[test]
    fn test_layout_without_sources() {
        let layout = ReportLayout::from_record(
            &record(DetailedAnalysis::Text("Body".to_string()), vec!["https://one"]),
            false,
            Utc::now(),
        )
        .unwrap();

        assert!(!headings(&layout).contains(&"Sources & References"));
        assert!(!layout.blocks.contains(&ReportBlock::PageBreak));
    }

    #[test]
    fn test_summary_split_into_paragraphs() {
        let layout = ReportLayout::from_record(
            &record(DetailedAnalysis::default(), vec![]),
            true,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(layout.blocks[3], ReportBlock::Paragraph("Para one.".to_string()));
        assert_eq!(layout.blocks[4], ReportBlock::Paragraph("Para two.".to_string()));
        assert!(!headings(&layout).contains(&"Detailed Analysis"));
        assert!(!headings(&layout).contains(&"Sources & References"));
    }

    #[test]
    fn test_incomplete_record_rejected() {
        let mut failed = ResearchRecord::new("res_x".to_string(), "Topic".to_string(), 3);
        failed.fail("search down");
        assert_eq!(failed.status, ResearchStatus::Failed);

        let err = ReportLayout::from_record(&failed, true, Utc::now()).unwrap_err();
        assert!(matches!(err, SleuthError::Validation(_)));
    }
}
