use serde_json::{Map, Value};

use crate::error::{Result, SleuthError};
use crate::models::{AnalysisSection, ConfidenceSource, DetailedAnalysis, FALLBACK_CONFIDENCE};

/// Keys checked, in order, for a model-reported confidence.
const CONFIDENCE_KEYS: [&str; 2] = ["confidence_score", "confidence"];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnalysis {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub detailed_analysis: DetailedAnalysis,
    pub confidence_score: f32,
    pub confidence_source: ConfidenceSource,
}

/// Validate a raw model response against the analysis contract.
///
/// `summary` must be a non-empty string and `key_findings` an array of strings.
/// Anything else is a [`SleuthError::MalformedResponse`]; no field is guessed.
pub fn parse_analysis_response(raw: &str) -> Result<ParsedAnalysis> {
    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            response_len = raw.len(),
            response_preview = %raw.chars().take(100).collect::<String>(),
            error = %e,
            "Failed to parse analysis response"
        );
        SleuthError::MalformedResponse(format!("response is not valid JSON: {e}"))
    })?;

    let Value::Object(object) = value else {
        return Err(SleuthError::MalformedResponse(
            "response is not a JSON object".to_string(),
        ));
    };

    let summary = match object.get("summary") {
        Some(Value::String(summary)) if !summary.trim().is_empty() => summary.trim().to_string(),
        Some(Value::String(_)) => {
            return Err(SleuthError::MalformedResponse(
                "`summary` is empty".to_string(),
            ))
        }
        Some(_) => {
            return Err(SleuthError::MalformedResponse(
                "`summary` must be a string".to_string(),
            ))
        }
        None => {
            return Err(SleuthError::MalformedResponse(
                "missing required field `summary`".to_string(),
            ))
        }
    };

    let key_findings = match object.get("key_findings") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(finding) => Ok(finding.trim().to_string()),
                _ => Err(SleuthError::MalformedResponse(format!(
                    "`key_findings[{index}]` must be a string"
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(SleuthError::MalformedResponse(
                "`key_findings` must be an array of strings".to_string(),
            ))
        }
        None => {
            return Err(SleuthError::MalformedResponse(
                "missing required field `key_findings`".to_string(),
            ))
        }
    };

    let detailed_analysis = parse_detailed_analysis(object.get("detailed_analysis"));
    let (confidence_score, confidence_source) = derive_confidence(&object);

    Ok(ParsedAnalysis {
        summary,
        key_findings,
        detailed_analysis,
        confidence_score,
        confidence_source,
    })
}

/// Model-reported confidence clamped to `[0, 1]`, or the fallback.
pub fn derive_confidence(object: &Map<String, Value>) -> (f32, ConfidenceSource) {
    CONFIDENCE_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_f64))
        .filter(|score| score.is_finite())
        .map(|score| (score.clamp(0.0, 1.0) as f32, ConfidenceSource::ModelReported))
        .unwrap_or((FALLBACK_CONFIDENCE, ConfidenceSource::Fallback))
}

fn parse_detailed_analysis(value: Option<&Value>) -> DetailedAnalysis {
    match value {
        None | Some(Value::Null) => DetailedAnalysis::default(),
        Some(Value::String(text)) => DetailedAnalysis::Text(text.trim().to_string()),
        Some(Value::Object(sections)) => DetailedAnalysis::Sections(
            sections
                .iter()
                .map(|(title, body)| AnalysisSection {
                    title: title.clone(),
                    body: value_to_text(body),
                })
                .collect(),
        ),
        Some(other) => DetailedAnalysis::Text(value_to_text(other)),
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| format!("- {}", value_to_text(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, item)| format!("{key}: {}", value_to_text(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
