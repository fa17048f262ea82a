use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::{
    dto::weather_dto::{WeatherLogFilter, WeatherLogListQuery},
    error::Result,
    services::export_service::{ExportService, CSV_CONTENT_TYPE, XLSX_CONTENT_TYPE},
    utils::extract::AppQuery,
    AppState,
};

fn attachment(content_type: &'static str, filename: String, body: Vec<u8>) -> impl IntoResponse {
    let disposition = format!("attachment; filename=\"{}\"", filename);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
}

/// Export weather logs as CSV
#[utoipa::path(
    get,
    path = "/weather/export/csv",
    params(WeatherLogListQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv"),
        (status = 400, description = "Invalid filter")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn export_csv(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<WeatherLogListQuery>,
) -> Result<impl IntoResponse> {
    let filter = WeatherLogFilter::from(&query);
    let logs = state
        .weather_service
        .fetch_range(&filter, state.export_max_rows)
        .await?;
    let buffer = ExportService::to_csv(&logs)?;
    tracing::info!(rows = logs.len(), "weather logs exported as CSV");
    Ok(attachment(
        CSV_CONTENT_TYPE,
        ExportService::filename("csv", chrono::Utc::now()),
        buffer,
    ))
}

/// Export weather logs as XLSX
#[utoipa::path(
    get,
    path = "/weather/export/xlsx",
    params(WeatherLogListQuery),
    responses(
        (status = 200, description = "XLSX workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Invalid filter")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn export_xlsx(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<WeatherLogListQuery>,
) -> Result<impl IntoResponse> {
    let filter = WeatherLogFilter::from(&query);
    let logs = state
        .weather_service
        .fetch_range(&filter, state.export_max_rows)
        .await?;
    let buffer = ExportService::to_xlsx(&logs)?;
    tracing::info!(rows = logs.len(), "weather logs exported as XLSX");
    Ok(attachment(
        XLSX_CONTENT_TYPE,
        ExportService::filename("xlsx", chrono::Utc::now()),
        buffer,
    ))
}
