use crate::dto::weather_dto::{CreateWeatherLogPayload, LocationPayload};
use crate::error::{Error, Result};
use crate::models::weather_log::WeatherLog;
use crate::services::weather_service::WeatherService;
use crate::utils::time::from_rfc3339;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use validator::Validate;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,cloud_cover,pressure_msl,wind_speed_10m,wind_direction_10m";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: Option<String>,
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    precipitation: Option<f64>,
    weather_code: Option<i32>,
    cloud_cover: Option<f64>,
    pressure_msl: Option<f64>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
}

/// Where the collector reads from.
#[derive(Debug, Clone)]
pub struct CollectTarget {
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Clone)]
pub struct CollectorService {
    client: Client,
    base_url: String,
    weather: WeatherService,
    target: Option<CollectTarget>,
}

impl CollectorService {
    pub fn new(
        client: Client,
        base_url: String,
        weather: WeatherService,
        target: Option<CollectTarget>,
    ) -> Self {
        Self {
            client,
            base_url,
            weather,
            target,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.target.is_some()
    }

    /// Current conditions at a point as an ingestible reading.
    pub async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
        city: Option<&str>,
    ) -> Result<CreateWeatherLogPayload> {
        let res = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("hourly", "precipitation_probability".to_string()),
                ("forecast_days", "1".to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ForecastResponse = res.json().await?;
        map_forecast(body, latitude, longitude, city)
    }

    /// Fetches the configured location and stores the reading.
    pub async fn collect_once(&self) -> Result<WeatherLog> {
        let Some(target) = self.target.as_ref() else {
            return Err(Error::BadRequest("Collector location is not configured".into()));
        };

        let payload = self
            .fetch_current(target.latitude, target.longitude, target.city.as_deref())
            .await?;
        payload.validate()?;
        let log = self.weather.create(payload).await?;
        tracing::info!(
            log_id = %log.id,
            latitude = target.latitude,
            longitude = target.longitude,
            "collector stored reading"
        );
        Ok(log)
    }
}

fn parse_time(raw: Option<&str>) -> DateTime<Utc> {
    // Open-Meteo sends "2025-12-04T10:15" without an offset when timezone=UTC
    raw.and_then(|t| {
        from_rfc3339(t).ok().or_else(|| {
            NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|n| n.and_utc())
        })
    })
    .unwrap_or_else(Utc::now)
}

fn map_forecast(
    body: ForecastResponse,
    latitude: f64,
    longitude: f64,
    city: Option<&str>,
) -> Result<CreateWeatherLogPayload> {
    let current = body
        .current
        .ok_or_else(|| anyhow::anyhow!("Open-Meteo response has no current block"))?;
    let missing = |field: &str| anyhow::anyhow!("Open-Meteo response is missing {}", field);

    let rain_probability = body
        .hourly
        .and_then(|h| h.precipitation_probability.into_iter().next())
        .flatten();

    Ok(CreateWeatherLogPayload {
        timestamp: parse_time(current.time.as_deref()),
        location: LocationPayload {
            city: city.map(str::to_string),
            latitude: Some(latitude),
            longitude: Some(longitude),
        },
        temperature: current.temperature_2m.ok_or_else(|| missing("temperature_2m"))?,
        apparent_temperature: current.apparent_temperature,
        humidity: current
            .relative_humidity_2m
            .ok_or_else(|| missing("relative_humidity_2m"))?,
        pressure: current.pressure_msl,
        wind_speed: current.wind_speed_10m.ok_or_else(|| missing("wind_speed_10m"))?,
        wind_direction: current.wind_direction_10m,
        precipitation: current.precipitation,
        rain_probability,
        cloud_cover: current.cloud_cover,
        weather_code: current.weather_code,
        condition: None,
    })
}
