use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::v1::response::ApiResponse;

#[derive(Error, Debug)]
pub enum SleuthError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Search unavailable after {attempts} attempt(s): {source}")]
    SearchUnavailable {
        attempts: u32,
        #[source]
        source: Box<SleuthError>,
    },

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("Analysis unavailable after {attempts} attempt(s): {source}")]
    AnalysisUnavailable {
        attempts: u32,
        #[source]
        source: Box<SleuthError>,
    },

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),

    #[error("Persistence failure: {source}")]
    PersistenceFailure {
        #[source]
        source: Box<SleuthError>,
    },

    #[error("Operation cancelled during {0}")]
    Cancelled(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for SleuthError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SleuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_unavailable_keeps_last_failure_as_source() {
        let err = SleuthError::SearchUnavailable {
            attempts: 3,
            source: Box::new(SleuthError::Search("connection refused".into())),
        };

        assert!(err.to_string().contains("3 attempt(s)"));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "Search provider error: connection refused");
    }

    #[test]
    fn malformed_response_maps_to_bad_gateway() {
        use axum::http::StatusCode;

        let response = SleuthError::MalformedResponse("missing summary".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
