use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::weather_log::WeatherLog;
use crate::utils::pagination::PageMeta;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_location"))]
pub struct LocationPayload {
    #[validate(length(max = 120))]
    pub city: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

fn validate_location(location: &LocationPayload) -> Result<(), ValidationError> {
    let has_city = location
        .city
        .as_deref()
        .map(|c| !c.trim().is_empty())
        .unwrap_or(false);
    let has_coordinates = location.latitude.is_some() && location.longitude.is_some();
    if has_city || has_coordinates {
        Ok(())
    } else {
        let mut err = ValidationError::new("location_required");
        err.message = Some("location needs a city or both latitude and longitude".into());
        Err(err)
    }
}

/// A reading as posted by collectors.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWeatherLogPayload {
    #[serde(alias = "recorded_at")]
    pub timestamp: DateTime<Utc>,
    #[validate(nested)]
    pub location: LocationPayload,
    #[validate(range(min = -100.0, max = 100.0))]
    pub temperature: f64,
    #[serde(default, alias = "apparentTemperature")]
    #[validate(range(min = -100.0, max = 100.0))]
    pub apparent_temperature: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity: f64,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub pressure: Option<f64>,
    #[serde(alias = "windSpeed")]
    #[validate(range(min = 0.0))]
    pub wind_speed: f64,
    #[serde(default, alias = "windDirection")]
    #[validate(range(min = 0.0, max = 360.0))]
    pub wind_direction: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub precipitation: Option<f64>,
    #[serde(default, alias = "precipitation_probability", alias = "rainProbability")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub rain_probability: Option<f64>,
    #[serde(default, alias = "cloudCover")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub cloud_cover: Option<f64>,
    #[serde(default, alias = "weatherCode")]
    #[validate(range(min = 0, max = 99))]
    pub weather_code: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Timestamp,
    Temperature,
    Humidity,
}

impl SortBy {
    pub fn column(&self) -> &'static str {
        match self {
            SortBy::Timestamp => "recorded_at",
            SortBy::Temperature => "temperature",
            SortBy::Humidity => "humidity",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct WeatherLogListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub city: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

/// Filter shared by listing, insights and export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherLogFilter {
    pub city: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<&WeatherLogListQuery> for WeatherLogFilter {
    fn from(query: &WeatherLogListQuery) -> Self {
        Self {
            city: query
                .city
                .as_ref()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            start_date: query.start_date,
            end_date: query.end_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WeatherLogListResponse {
    pub items: Vec<WeatherLog>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct LatestQuery {
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DayClassification {
    pub log_id: uuid::Uuid,
    pub recorded_at: DateTime<Utc>,
    pub classification: String,
    pub description: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub cloud_cover: Option<f64>,
    pub rain_probability: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reading() -> serde_json::Value {
        json!({
            "timestamp": "2025-12-04T10:00:00Z",
            "location": { "city": "São Luís", "latitude": -2.53, "longitude": -44.3 },
            "temperature": 28.5,
            "apparent_temperature": 30.2,
            "humidity": 65,
            "pressure": 1013.25,
            "wind_speed": 15.4,
            "wind_direction": 180,
            "precipitation": 0,
            "cloud_cover": 25,
            "weather_code": 1
        })
    }

    #[test]
    fn valid_reading_passes() {
        let payload: CreateWeatherLogPayload = serde_json::from_value(reading()).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let payload: CreateWeatherLogPayload = serde_json::from_value(json!({
            "timestamp": "2025-12-04T10:00:00Z",
            "location": { "city": "Recife" },
            "temperature": 27.0,
            "humidity": 70,
            "windSpeed": 12.0,
            "weatherCode": 61,
            "cloudCover": 90
        }))
        .unwrap();
        assert_eq!(payload.weather_code, Some(61));
        assert_eq!(payload.cloud_cover, Some(90.0));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn out_of_range_humidity_is_rejected() {
        let mut raw = reading();
        raw["humidity"] = json!(140);
        let payload: CreateWeatherLogPayload = serde_json::from_value(raw).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("humidity"));
    }

    #[test]
    fn negative_wind_is_rejected() {
        let mut raw = reading();
        raw["wind_speed"] = json!(-1.0);
        let payload: CreateWeatherLogPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn reading_without_location_is_rejected() {
        let mut raw = reading();
        raw["location"] = json!({ "latitude": 10.0 });
        let payload: CreateWeatherLogPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.validate().is_err());

        let mut raw = reading();
        raw["location"] = json!({ "city": "   " });
        let payload: CreateWeatherLogPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn coordinates_alone_are_a_location() {
        let mut raw = reading();
        raw["location"] = json!({ "latitude": -23.55, "longitude": -46.63 });
        let payload: CreateWeatherLogPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn sort_columns_are_whitelisted() {
        assert_eq!(SortBy::Timestamp.column(), "recorded_at");
        assert_eq!(SortBy::Humidity.column(), "humidity");
        assert_eq!(SortOrder::default().keyword(), "DESC");
    }

    #[test]
    fn filter_drops_blank_city() {
        let query = WeatherLogListQuery {
            city: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(WeatherLogFilter::from(&query).city, None);
    }
}
