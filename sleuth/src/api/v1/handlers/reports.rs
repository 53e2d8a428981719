//! v1 Report handlers.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::api::extractors::AppJson;
use crate::api::v1::dto::{CreateReportRequest, ReportResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

/// `POST /api/v1/reports`
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    tag = "reports",
    operation_id = "reports.create",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "PDF report generated", body = ReportResponse),
        (status = 400, description = "Research is not completed", body = ApiError),
        (status = 404, description = "Research not found", body = ApiError),
    )
)]
pub async fn create_report(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateReportRequest>,
) -> ApiResponse<ReportResponse> {
    if req.research_id.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "researchId cannot be empty");
    }

    match state
        .reports
        .generate(req.research_id.trim(), req.include_sources.unwrap_or(true))
        .await
    {
        Ok(report) => ApiResponse::created(ReportResponse::from(report)),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/downloads/{fileName}`
#[utoipa::path(
    get,
    path = "/api/v1/downloads/{fileName}",
    tag = "reports",
    operation_id = "reports.download",
    params(("fileName" = String, Path, description = "Report file name")),
    responses(
        (status = 200, description = "PDF bytes", content_type = "application/pdf"),
        (status = 400, description = "Invalid file name", body = ApiError),
        (status = 404, description = "Report not found", body = ApiError),
    )
)]
pub async fn download_report(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Response {
    let path = match state.reports.resolve_download(&file_name) {
        Ok(path) => path,
        Err(e) => return ApiResponse::<()>::from(e).into_response(),
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{file_name}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => ApiResponse::<()>::from(crate::error::SleuthError::from(e)).into_response(),
    }
}
