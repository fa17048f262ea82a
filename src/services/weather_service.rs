use crate::dto::weather_dto::{
    CreateWeatherLogPayload, DayClassification, WeatherLogFilter, WeatherLogListQuery,
};
use crate::error::{Error, Result};
use crate::models::weather_log::{describe_weather_code, WeatherLog, WEATHER_LOG_COLUMNS};
use crate::utils::pagination::{PageMeta, Pagination};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct WeatherService {
    pool: PgPool,
}

pub struct WeatherLogList {
    pub items: Vec<WeatherLog>,
    pub meta: PageMeta,
}

// Shared by every filtered read; binds are $1 city, $2 start, $3 end.
const FILTER_CLAUSE: &str = "WHERE ($1::text IS NULL OR LOWER(city) = LOWER($1))
  AND ($2::timestamptz IS NULL OR recorded_at >= $2)
  AND ($3::timestamptz IS NULL OR recorded_at <= $3)";

impl WeatherService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateWeatherLogPayload) -> Result<WeatherLog> {
        let city = payload
            .location
            .city
            .as_ref()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let condition = resolve_condition(payload.condition.as_deref(), payload.weather_code);

        let query = format!(
            "INSERT INTO weather_logs (
                id, recorded_at, city, latitude, longitude, temperature, apparent_temperature,
                humidity, pressure, wind_speed, wind_direction, precipitation, rain_probability,
                cloud_cover, weather_code, condition
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16)
            RETURNING {}",
            WEATHER_LOG_COLUMNS
        );

        let log = sqlx::query_as::<_, WeatherLog>(&query)
            .bind(Uuid::new_v4())
            .bind(payload.timestamp)
            .bind(city)
            .bind(payload.location.latitude)
            .bind(payload.location.longitude)
            .bind(payload.temperature)
            .bind(payload.apparent_temperature)
            .bind(payload.humidity)
            .bind(payload.pressure)
            .bind(payload.wind_speed)
            .bind(payload.wind_direction)
            .bind(payload.precipitation)
            .bind(payload.rain_probability)
            .bind(payload.cloud_cover)
            .bind(payload.weather_code)
            .bind(condition)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(
            log_id = %log.id,
            city = log.city.as_deref().unwrap_or("-"),
            temperature = log.temperature,
            humidity = log.humidity,
            "weather log stored"
        );
        Ok(log)
    }

    pub async fn list(&self, query: WeatherLogListQuery) -> Result<WeatherLogList> {
        let filter = WeatherLogFilter::from(&query);
        check_range(&filter)?;
        let pagination = Pagination::new(query.page, query.limit);
        let sort_by = query.sort_by.unwrap_or_default();
        let sort_order = query.sort_order.unwrap_or_default();

        let items_query = format!(
            "SELECT {} FROM weather_logs {} ORDER BY {} {}, id {} LIMIT $4 OFFSET $5",
            WEATHER_LOG_COLUMNS,
            FILTER_CLAUSE,
            sort_by.column(),
            sort_order.keyword(),
            sort_order.keyword(),
        );
        let items = sqlx::query_as::<_, WeatherLog>(&items_query)
            .bind(filter.city.as_deref())
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(pagination.limit)
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        let total_query = format!("SELECT COUNT(*) FROM weather_logs {}", FILTER_CLAUSE);
        let total = sqlx::query_scalar::<_, i64>(&total_query)
            .bind(filter.city.as_deref())
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_one(&self.pool)
            .await?;

        Ok(WeatherLogList {
            items,
            meta: pagination.meta(total),
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<WeatherLog> {
        let query = format!("SELECT {} FROM weather_logs WHERE id = $1", WEATHER_LOG_COLUMNS);
        sqlx::query_as::<_, WeatherLog>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Weather log not found".into()))
    }

    pub async fn latest(&self, city: Option<&str>) -> Result<WeatherLog> {
        let query = format!(
            "SELECT {} FROM weather_logs
             WHERE ($1::text IS NULL OR LOWER(city) = LOWER($1))
             ORDER BY recorded_at DESC LIMIT 1",
            WEATHER_LOG_COLUMNS
        );
        sqlx::query_as::<_, WeatherLog>(&query)
            .bind(city.map(str::trim).filter(|c| !c.is_empty()))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("No weather logs recorded yet".into()))
    }

    /// Every reading matching `filter`, newest first, capped at `cap` rows.
    pub async fn fetch_range(&self, filter: &WeatherLogFilter, cap: i64) -> Result<Vec<WeatherLog>> {
        check_range(filter)?;
        let query = format!(
            "SELECT {} FROM weather_logs {} ORDER BY recorded_at DESC, id DESC LIMIT $4",
            WEATHER_LOG_COLUMNS, FILTER_CLAUSE
        );
        let items = sqlx::query_as::<_, WeatherLog>(&query)
            .bind(filter.city.as_deref())
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(cap.max(1))
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}

fn check_range(filter: &WeatherLogFilter) -> Result<()> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        if start > end {
            return Err(Error::BadRequest(
                "start_date must not be after end_date".into(),
            ));
        }
    }
    Ok(())
}

fn resolve_condition(condition: Option<&str>, weather_code: Option<i32>) -> Option<String> {
    condition
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .or_else(|| weather_code.map(|code| describe_weather_code(code).to_string()))
}

/// Labels a reading with a day type.
pub fn classify(log: &WeatherLog) -> DayClassification {
    let rain = log.rain_probability.unwrap_or(0.0);
    let clouds = log.cloud_cover.unwrap_or(50.0);
    let temp = log.temperature;
    let humidity = log.humidity;
    let wind = log.wind_speed;

    let (classification, description) = if rain >= 70.0 {
        ("RAINY", "Rainy day, high chance of precipitation")
    } else if temp >= 30.0 {
        if humidity >= 70.0 {
            ("HOT_HUMID", "Hot and humid day, high thermal discomfort")
        } else {
            ("HOT_DRY", "Hot and dry day, elevated temperature")
        }
    } else if temp <= 15.0 {
        if wind >= 20.0 {
            ("COLD_WINDY", "Cold and windy day, lower feels-like temperature")
        } else {
            ("COLD", "Cold day, low temperature")
        }
    } else if clouds >= 80.0 {
        ("CLOUDY", "Cloudy day, heavy cloud cover")
    } else if clouds <= 20.0 {
        ("SUNNY", "Sunny day, clear sky")
    } else if wind >= 30.0 {
        ("WINDY", "Windy day, strong winds")
    } else if (20.0..=28.0).contains(&temp)
        && (40.0..=60.0).contains(&humidity)
        && rain <= 30.0
        && wind <= 15.0
    {
        ("PLEASANT", "Pleasant day, ideal conditions")
    } else {
        ("MODERATE", "Moderate day, normal conditions")
    };

    DayClassification {
        log_id: log.id,
        recorded_at: log.recorded_at,
        classification: classification.to_string(),
        description: description.to_string(),
        temperature: log.temperature,
        humidity: log.humidity,
        wind_speed: log.wind_speed,
        cloud_cover: log.cloud_cover,
        rain_probability: log.rain_probability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn log(temp: f64, humidity: f64, wind: f64, clouds: Option<f64>, rain: Option<f64>) -> WeatherLog {
        WeatherLog {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            city: Some("Curitiba".into()),
            latitude: None,
            longitude: None,
            temperature: temp,
            apparent_temperature: None,
            humidity,
            pressure: None,
            wind_speed: wind,
            wind_direction: None,
            precipitation: None,
            rain_probability: rain,
            cloud_cover: clouds,
            weather_code: None,
            condition: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rain_wins_over_temperature() {
        let c = classify(&log(35.0, 80.0, 5.0, Some(90.0), Some(75.0)));
        assert_eq!(c.classification, "RAINY");
    }

    #[test]
    fn hot_days_split_on_humidity() {
        assert_eq!(classify(&log(32.0, 75.0, 5.0, None, None)).classification, "HOT_HUMID");
        assert_eq!(classify(&log(32.0, 30.0, 5.0, None, None)).classification, "HOT_DRY");
    }

    #[test]
    fn cold_days_split_on_wind() {
        assert_eq!(classify(&log(10.0, 50.0, 25.0, None, None)).classification, "COLD_WINDY");
        assert_eq!(classify(&log(10.0, 50.0, 5.0, None, None)).classification, "COLD");
    }

    #[test]
    fn cloud_cover_and_wind() {
        assert_eq!(classify(&log(22.0, 50.0, 10.0, Some(85.0), None)).classification, "CLOUDY");
        assert_eq!(classify(&log(22.0, 50.0, 10.0, Some(10.0), None)).classification, "SUNNY");
        assert_eq!(classify(&log(22.0, 50.0, 35.0, Some(50.0), None)).classification, "WINDY");
    }

    #[test]
    fn pleasant_and_moderate() {
        assert_eq!(classify(&log(24.0, 50.0, 10.0, Some(50.0), Some(10.0))).classification, "PLEASANT");
        assert_eq!(classify(&log(24.0, 75.0, 10.0, Some(50.0), Some(10.0))).classification, "MODERATE");
    }

    #[test]
    fn condition_falls_back_to_wmo_text() {
        assert_eq!(resolve_condition(None, Some(95)).as_deref(), Some("Thunderstorm"));
        assert_eq!(resolve_condition(Some("Breezy"), Some(0)).as_deref(), Some("Breezy"));
        assert_eq!(resolve_condition(Some("  "), None), None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let filter = WeatherLogFilter {
            city: None,
            start_date: Some(Utc::now()),
            end_date: Some(Utc::now() - chrono::Duration::days(1)),
        };
        assert!(matches!(check_range(&filter), Err(Error::BadRequest(_))));
    }
}
