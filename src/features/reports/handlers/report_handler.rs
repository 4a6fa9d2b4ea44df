use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::reports::dtos::{
    CreateReportDto, DeleteOutcome, EventVocabularyDto, ReportIdDto, ReportItemDetailsDto,
    UpdateReportDto,
};
use crate::features::reports::models::EVENT_NAMES;
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Submit a new report
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 201, description = "Report created", body = ApiResponse<ReportIdDto>),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Report could not be created")
    ),
    tag = "reports"
)]
pub async fn create_report(
    State(service): State<Arc<ReportService>>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportIdDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let created = service.create(&dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(created),
            Some("Report created".to_string()),
            None,
        )),
    ))
}

/// List reports page by page, ordered by id
#[utoipa::path(
    get,
    path = "/api/reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of reports", body = ApiResponse<Vec<ReportItemDetailsDto>>),
        (status = 400, description = "Invalid page parameters"),
        (status = 404, description = "No reports on this page")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(service): State<Arc<ReportService>>,
    AppQuery(params): AppQuery<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ReportItemDetailsDto>>>> {
    params
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let reports = service.list_page(&params).await?;
    if reports.is_empty() {
        return Err(AppError::NotFound(format!(
            "No reports found on page {}",
            params.page
        )));
    }

    let total = service.count().await?;
    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// Get report details by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportItemDetailsDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(service): State<Arc<ReportService>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<ReportItemDetailsDto>>> {
    let report = service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Partially update a report
#[utoipa::path(
    put,
    path = "/api/reports/{id}",
    params(
        ("id" = i32, Path, description = "Report ID")
    ),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Report not found"),
        (status = 500, description = "Report could not be updated")
    ),
    tag = "reports"
)]
pub async fn update_report(
    State(service): State<Arc<ReportService>>,
    AppPath(id): AppPath<i32>,
    AppJson(dto): AppJson<UpdateReportDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.update(id, &dto).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Report updated".to_string()),
        None,
    )))
}

/// Delete a report with its text and events
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(
        ("id" = i32, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted", body = ApiResponse<DeleteOutcome>),
        (status = 404, description = "Report not found"),
        (status = 500, description = "Report could not be deleted")
    ),
    tag = "reports"
)]
pub async fn delete_report(
    State(service): State<Arc<ReportService>>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<ApiResponse<DeleteOutcome>>> {
    let outcome = service.delete_by_id(id).await;

    if !outcome.success {
        return Err(AppError::Internal(format!("Failed to delete report {}", id)));
    }
    if !outcome.found {
        return Err(AppError::NotFound(format!("Report {} not found", id)));
    }

    Ok(Json(ApiResponse::success(
        Some(outcome),
        Some("Report deleted".to_string()),
        None,
    )))
}

/// List the event tags a report may carry
#[utoipa::path(
    get,
    path = "/api/reports/events",
    responses(
        (status = 200, description = "Allowed event tags", body = ApiResponse<EventVocabularyDto>)
    ),
    tag = "reports"
)]
pub async fn list_event_tags() -> Json<ApiResponse<EventVocabularyDto>> {
    let vocabulary = EventVocabularyDto {
        events: EVENT_NAMES.iter().map(|name| name.to_string()).collect(),
    };
    Json(ApiResponse::success(Some(vocabulary), None, None))
}
