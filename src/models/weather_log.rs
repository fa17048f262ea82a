use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WeatherLog {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub temperature: f64,
    pub apparent_temperature: Option<f64>,
    pub humidity: f64,
    pub pressure: Option<f64>,
    pub wind_speed: f64,
    pub wind_direction: Option<f64>,
    pub precipitation: Option<f64>,
    pub rain_probability: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub weather_code: Option<i32>,
    pub condition: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub const WEATHER_LOG_COLUMNS: &str = "id, recorded_at, city, latitude, longitude, temperature, apparent_temperature, humidity, pressure, wind_speed, wind_direction, precipitation, rain_probability, cloud_cover, weather_code, condition, created_at";

/// Text for a WMO weather interpretation code.
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow fall",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}
