use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::weather_dto::{
        CreateWeatherLogPayload, DayClassification, LatestQuery, WeatherLogListQuery,
        WeatherLogListResponse,
    },
    error::{Error, Result},
    models::weather_log::WeatherLog,
    services::weather_service::classify,
    utils::{
        crypto::secrets_match,
        extract::{AppJson, AppPath, AppQuery},
    },
    AppState,
};

pub const INGEST_KEY_HEADER: &str = "x-ingest-key";

fn check_ingest_key(expected: Option<&str>, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let provided = headers
        .get(INGEST_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if secrets_match(provided, expected) {
        Ok(())
    } else {
        Err(Error::Unauthorized("Invalid ingest key".into()))
    }
}

#[utoipa::path(
    post,
    path = "/weather/logs",
    request_body = CreateWeatherLogPayload,
    params(("x-ingest-key" = Option<String>, Header, description = "Required when ingestion is key-protected")),
    responses(
        (status = 201, description = "Reading stored", body = WeatherLog),
        (status = 400, description = "Invalid reading"),
        (status = 401, description = "Missing or wrong ingest key")
    )
)]
#[axum::debug_handler]
pub async fn create_weather_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(payload): AppJson<CreateWeatherLogPayload>,
) -> Result<impl IntoResponse> {
    check_ingest_key(state.ingest_api_key.as_deref(), &headers)?;
    payload.validate()?;
    let log = state.weather_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    get,
    path = "/weather/logs",
    params(WeatherLogListQuery),
    responses(
        (status = 200, description = "Page of readings", body = WeatherLogListResponse),
        (status = 400, description = "Invalid filter")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_weather_logs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<WeatherLogListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.weather_service.list(query).await?;
    Ok(Json(WeatherLogListResponse {
        items: list.items,
        meta: list.meta,
    }))
}

#[utoipa::path(
    get,
    path = "/weather/logs/latest",
    params(LatestQuery),
    responses(
        (status = 200, description = "Newest reading", body = WeatherLog),
        (status = 404, description = "No readings yet")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn latest_weather_log(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LatestQuery>,
) -> Result<impl IntoResponse> {
    let log = state.weather_service.latest(query.city.as_deref()).await?;
    Ok(Json(log))
}

#[utoipa::path(
    get,
    path = "/weather/logs/latest/classification",
    params(LatestQuery),
    responses(
        (status = 200, description = "Day type of the newest reading", body = DayClassification),
        (status = 404, description = "No readings yet")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn latest_classification(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LatestQuery>,
) -> Result<impl IntoResponse> {
    let log = state.weather_service.latest(query.city.as_deref()).await?;
    Ok(Json(classify(&log)))
}

#[utoipa::path(
    get,
    path = "/weather/logs/{id}",
    params(("id" = Uuid, Path, description = "Reading ID")),
    responses(
        (status = 200, description = "Reading", body = WeatherLog),
        (status = 404, description = "Reading not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_weather_log(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse> {
    let log = state.weather_service.get_by_id(id).await?;
    Ok(Json(log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn ingest_key_is_optional_until_configured() {
        assert!(check_ingest_key(None, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn ingest_key_must_match() {
        let mut headers = HeaderMap::new();
        assert!(check_ingest_key(Some("s3cret"), &headers).is_err());
        headers.insert(INGEST_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert!(check_ingest_key(Some("s3cret"), &headers).is_err());
        headers.insert(INGEST_KEY_HEADER, HeaderValue::from_static("s3cret"));
        assert!(check_ingest_key(Some("s3cret"), &headers).is_ok());
    }
}
