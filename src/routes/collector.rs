use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{error::Result, models::weather_log::WeatherLog, AppState};

#[utoipa::path(
    post,
    path = "/weather/collect",
    responses(
        (status = 201, description = "Reading collected and stored", body = WeatherLog),
        (status = 400, description = "Collector location not configured"),
        (status = 502, description = "Open-Meteo unavailable")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn collect_now(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let log = state.collector_service.collect_once().await?;
    Ok((StatusCode::CREATED, Json(log)))
}
