//! # V1 API Response Envelope & Error Contract
//!
//! Every v1 endpoint returns an [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },       // present on success, and on failed research runs
//!   "meta": { "total": 42 },
//!   "error": { "code": "upstream_error", "message": "..." }
//! }
//! ```
//!
//! ## ID Formats
//!
//! - **researchId**: `res_` followed by 12 hex characters (e.g. `"res_1f0c9a7b2e44"`)
//! - **reportId**: `rpt_` followed by 12 hex characters
//!
//! A failed research run is the one case where both `data` and `error` are
//! present: `data` carries the persisted failed record with its partial sources.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::SleuthError;

/// Machine-readable error code included in every error response.
///
/// Serialized as a snake_case string on the wire (e.g. `"invalid_request"`).
/// Each variant maps to a fixed HTTP status code via [`ErrorCode::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request was malformed, had invalid parameters, or failed validation.
    /// HTTP 400.
    InvalidRequest,
    /// Authentication is required or the provided credentials are invalid.
    /// HTTP 401.
    Unauthorized,
    /// The requested resource does not exist. HTTP 404.
    NotFound,
    /// An unexpected server-side error occurred. Internal details are never
    /// leaked to the client. HTTP 500.
    InternalError,
    /// The requested feature is not configured on this server. HTTP 501.
    NotImplemented,
    /// The search provider or inference service failed after retries. HTTP 502.
    UpstreamError,
    /// The server is shutting down or the request was cancelled. HTTP 503.
    ServiceUnavailable,
}

impl ErrorCode {
    /// Returns the HTTP status code corresponding to this error code.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            Self::UpstreamError => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid_request"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound => write!(f, "not_found"),
            Self::InternalError => write!(f, "internal_error"),
            Self::NotImplemented => write!(f, "not_implemented"),
            Self::UpstreamError => write!(f, "upstream_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
        }
    }
}

/// Structured error payload within the API envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    /// Machine-readable error classification.
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

/// Listing metadata.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// Number of items returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Canonical v1 API response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Success response with listing metadata (HTTP 200).
    pub fn success_with_meta(data: T, meta: ResponseMeta) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Resource created response (HTTP 201).
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
            error: None,
            status: StatusCode::CREATED,
        }
    }

    /// Error response. HTTP status is derived from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            meta: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }

    /// Error response that still carries a payload, used for failed research runs.
    pub fn error_with_data(data: T, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            ..Self::error(code, message)
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl ErrorCode {
    /// Classify a [`SleuthError`] and pick the message that is safe to expose.
    pub fn classify(err: &SleuthError) -> (Self, String) {
        match err {
            SleuthError::NotFound(msg) => (Self::NotFound, msg.clone()),
            SleuthError::Validation(msg) => (Self::InvalidRequest, msg.clone()),
            SleuthError::Json(e) => (Self::InvalidRequest, format!("Invalid JSON: {e}")),

            SleuthError::LlmUnavailable(msg) => (Self::NotImplemented, msg.clone()),

            SleuthError::LlmRateLimit { retry_after } => {
                let msg = match retry_after {
                    Some(secs) => format!("Rate limit exceeded, retry after {secs} seconds"),
                    None => "Rate limit exceeded".to_string(),
                };
                (Self::UpstreamError, msg)
            }

            upstream @ (SleuthError::Search(_)
            | SleuthError::SearchUnavailable { .. }
            | SleuthError::Llm(_)
            | SleuthError::AnalysisUnavailable { .. }
            | SleuthError::MalformedResponse(_)
            | SleuthError::Http(_)) => (Self::UpstreamError, upstream.to_string()),

            cancelled @ SleuthError::Cancelled(_) => {
                (Self::ServiceUnavailable, cancelled.to_string())
            }

            internal @ (SleuthError::Database(_)
            | SleuthError::Io(_)
            | SleuthError::PersistenceFailure { .. }
            | SleuthError::Report(_)
            | SleuthError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                (Self::InternalError, "An internal error occurred".to_string())
            }
        }
    }
}

impl<T: Serialize> From<SleuthError> for ApiResponse<T> {
    fn from(err: SleuthError) -> Self {
        let (code, message) = ErrorCode::classify(&err);
        ApiResponse::error(code, message)
    }
}
