use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::SleuthError;

/// `axum::Json` whose rejections render as the v1 error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(SleuthError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for SleuthError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> SleuthError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                SleuthError::Validation(format!("Missing required field: {field}"))
            } else {
                SleuthError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            SleuthError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            SleuthError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(_) => {
            SleuthError::Internal("Failed to read request body".to_string())
        }
        _ => SleuthError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
