use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{params, Connection};

use crate::error::{Result, SleuthError};
use crate::models::{AnalysisResult, ResearchRecord, ResearchStatus, ResearchSummary};

const RECORD_COLUMNS: &str = "id, topic, status, depth, analysis, sources, error_message, \
                              duration_ms, created_at, updated_at";

/// Upper bound on rows scored in Rust after the LIKE prefilter.
const MAX_SIMILARITY_CANDIDATES: u32 = 200;

pub struct ResearchRepository;

impl ResearchRepository {
    pub async fn upsert(conn: &Connection, record: &ResearchRecord) -> Result<()> {
        let analysis = record
            .analysis
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO research (
                id, topic, status, depth, analysis, sources, error_message,
                duration_ms, search_text, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO UPDATE SET
                topic = excluded.topic,
                status = excluded.status,
                depth = excluded.depth,
                analysis = excluded.analysis,
                sources = excluded.sources,
                error_message = excluded.error_message,
                duration_ms = excluded.duration_ms,
                search_text = excluded.search_text,
                updated_at = excluded.updated_at
            "#,
            params![
                record.id.clone(),
                record.topic.clone(),
                record.status.to_string(),
                record.depth as i64,
                analysis,
                serde_json::to_string(&record.sources)?,
                record.error.clone(),
                record.duration_ms.map(|ms| ms as i64),
                search_text(record),
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<ResearchRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM research WHERE id = ?1");
        let mut rows = conn.query(&sql, params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_record(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_recent(conn: &Connection, limit: u32) -> Result<Vec<ResearchSummary>> {
        let mut rows = conn
            .query(
                "SELECT id, topic, status, created_at FROM research \
                 ORDER BY created_at DESC, rowid DESC LIMIT ?1",
                params![limit as i64],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(ResearchSummary {
                id: row.get::<String>(0)?,
                topic: row.get::<String>(1)?,
                status: parse_status(&row.get::<String>(2)?)?,
                created_at: parse_timestamp(&row.get::<String>(3)?)?,
            });
        }
        Ok(results)
    }

    /// Completed records whose search text contains any of `terms`.
    pub async fn completed_candidates(
        conn: &Connection,
        terms: &[String],
    ) -> Result<Vec<(ResearchRecord, String)>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut clauses = String::new();
        for i in 0..terms.len() {
            if i > 0 {
                clauses.push_str(" OR ");
            }
            clauses.push_str("search_text LIKE ?");
            clauses.push_str(&(i + 1).to_string());
        }

        let sql = format!(
            "SELECT {RECORD_COLUMNS}, search_text FROM research \
             WHERE status = 'completed' AND ({clauses}) \
             ORDER BY created_at DESC LIMIT {MAX_SIMILARITY_CANDIDATES}"
        );
        let params: Vec<libsql::Value> = terms
            .iter()
            .map(|term| libsql::Value::from(format!("%{}%", escape_like(term))))
            .collect();

        let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let record = Self::row_to_record(&row)?;
            results.push((record, row.get::<String>(10)?));
        }
        Ok(results)
    }

    pub async fn ping(conn: &Connection) -> Result<()> {
        let mut rows = conn.query("SELECT 1", ()).await?;
        rows.next().await?;
        Ok(())
    }

    fn row_to_record(row: &libsql::Row) -> Result<ResearchRecord> {
        let analysis = row
            .get::<Option<String>>(4)?
            .map(|json| serde_json::from_str::<AnalysisResult>(&json))
            .transpose()?;

        Ok(ResearchRecord {
            id: row.get::<String>(0)?,
            topic: row.get::<String>(1)?,
            status: parse_status(&row.get::<String>(2)?)?,
            depth: u8::try_from(row.get::<i64>(3)?).unwrap_or(3),
            analysis,
            sources: serde_json::from_str(&row.get::<String>(5)?).unwrap_or_default(),
            error: row.get::<Option<String>>(6)?,
            duration_ms: row
                .get::<Option<i64>>(7)?
                .and_then(|ms| u64::try_from(ms).ok()),
            created_at: parse_timestamp(&row.get::<String>(8)?)?,
            updated_at: parse_timestamp(&row.get::<String>(9)?)?,
        })
    }
}

/// Lowercased topic, summary and findings used for lexical lookup.
fn search_text(record: &ResearchRecord) -> String {
    let mut text = record.topic.clone();
    if let Some(analysis) = &record.analysis {
        text.push('\n');
        text.push_str(&analysis.summary);
        for finding in &analysis.key_findings {
            text.push('\n');
            text.push_str(finding);
        }
    }
    text.to_lowercase()
}

fn escape_like(term: &str) -> String {
    term.replace('%', "").replace('_', "")
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SleuthError::Internal(format!("Invalid timestamp '{value}': {e}")))
}

fn parse_status(value: &str) -> Result<ResearchStatus> {
    value.parse().map_err(SleuthError::Internal)
}
