use crate::dto::insight_dto::{
    ComfortClass, ComfortFactor, ComfortFactors, ComfortIndex, ComfortQuery, FactorStatus,
    HumidityStats, InsightQuery, InsightReport, InsightScope, PeriodStats, PrecipitationStats,
    Severity, TemperatureStats, WeatherPattern, WeatherStatistics, WindStats,
};
use crate::dto::weather_dto::WeatherLogFilter;
use crate::error::{Error, Result};
use crate::models::insight_cache::InsightCacheEntry;
use crate::models::weather_log::WeatherLog;
use crate::services::ai_service::AIService;
use crate::services::weather_service::WeatherService;
use crate::utils::crypto::sha256_hex;
use crate::utils::time::{now, period_duration};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const DEFAULT_PERIOD: &str = "7d";
const MAX_READINGS: i64 = 5_000;
const PATTERN_WINDOW: usize = 10;

#[derive(Clone)]
pub struct InsightService {
    pool: PgPool,
    weather: WeatherService,
    ai: AIService,
    cache_ttl: Duration,
}

/// A resolved insight request: what to read and where to cache it.
/// `cache_key` is `None` for ranges that end at the request time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScope {
    pub scope: InsightScope,
    pub filter: WeatherLogFilter,
    pub cache_key: Option<String>,
}

impl InsightService {
    pub fn new(pool: PgPool, weather: WeatherService, ai: AIService, cache_hours: i64) -> Self {
        Self {
            pool,
            weather,
            ai,
            cache_ttl: Duration::hours(cache_hours.max(0)),
        }
    }

    /// Serves a fresh cached report for the scope or generates a new one.
    pub async fn get_insights(&self, query: &InsightQuery, force: bool) -> Result<InsightReport> {
        let resolved = resolve_scope(query, now())?;

        if let (false, Some(cache_key)) = (force, resolved.cache_key.as_deref()) {
            let entry = self
                .cached(cache_key)
                .await?
                .filter(|e| e.is_fresh(now()));
            if let Some(entry) = entry {
                match serde_json::from_value::<InsightReport>(entry.report) {
                    Ok(mut report) => {
                        tracing::debug!(cache_key = %cache_key, "insight cache hit");
                        report.cached = true;
                        return Ok(report);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "discarding unreadable insight cache entry");
                    }
                }
            }
        }

        self.generate(resolved).await
    }

    async fn generate(&self, resolved: ResolvedScope) -> Result<InsightReport> {
        let logs = self.weather.fetch_range(&resolved.filter, MAX_READINGS).await?;
        let Some(stats) = statistics(&logs) else {
            return Err(Error::NotFound(
                "No weather logs found for the requested scope".into(),
            ));
        };

        let ai_summary = self.ai.narrate_weather(&stats, &logs).await;
        let generated_at = now();
        let report = build_report(
            resolved.scope,
            stats,
            &logs,
            ai_summary,
            generated_at,
            generated_at + self.cache_ttl,
        );

        if let Some(cache_key) = resolved.cache_key.as_deref() {
            self.store(cache_key, &report).await?;
        }
        tracing::info!(
            cache_key = resolved.cache_key.as_deref().unwrap_or("-"),
            records = logs.len(),
            patterns = report.patterns.len(),
            ai = report.ai_summary.is_some(),
            "insight report generated"
        );
        Ok(report)
    }

    async fn cached(&self, cache_key: &str) -> Result<Option<InsightCacheEntry>> {
        let entry = sqlx::query_as::<_, InsightCacheEntry>(
            "SELECT id, cache_key, report, generated_at, expires_at
             FROM insight_cache
             WHERE cache_key = $1 AND expires_at > NOW()",
        )
        .bind(cache_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn store(&self, cache_key: &str, report: &InsightReport) -> Result<()> {
        let value = serde_json::to_value(report)?;
        sqlx::query(
            "INSERT INTO insight_cache (id, cache_key, report, generated_at, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (cache_key) DO UPDATE
             SET report = EXCLUDED.report,
                 generated_at = EXCLUDED.generated_at,
                 expires_at = EXCLUDED.expires_at",
        )
        .bind(Uuid::new_v4())
        .bind(cache_key)
        .bind(value)
        .bind(report.generated_at)
        .bind(report.expires_at)
        .execute(&self.pool)
        .await?;

        let purged = self.purge_expired().await?;
        if purged > 0 {
            tracing::debug!(purged, "expired insight cache entries purged");
        }
        Ok(())
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        let res = sqlx::query("DELETE FROM insight_cache WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    /// Comfort index from explicit values, or from the latest reading when
    /// any of the three is missing.
    pub async fn comfort(&self, query: &ComfortQuery) -> Result<ComfortIndex> {
        if let (Some(t), Some(h), Some(w)) = (query.temperature, query.humidity, query.wind_speed) {
            return Ok(comfort_index(t, h, w));
        }
        let latest = self.weather.latest(None).await?;
        Ok(comfort_index(
            latest.temperature,
            latest.humidity,
            latest.wind_speed,
        ))
    }
}

pub fn resolve_scope(query: &InsightQuery, now: DateTime<Utc>) -> Result<ResolvedScope> {
    let city = query
        .city
        .as_ref()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    let period = query.period.as_deref().unwrap_or(DEFAULT_PERIOD);
    let window = period_duration(period).ok_or_else(|| {
        Error::BadRequest("period must be one of 24h, 7d, 30d".into())
    })?;
    let city_key = city.as_deref().unwrap_or("*").to_lowercase();

    let explicit = query.start_date.is_some() || query.end_date.is_some();
    let open_ended = query.start_date.is_some() && query.end_date.is_none();
    let end_date = query.end_date.unwrap_or(now);
    let start_date = query.start_date.unwrap_or(end_date - window);
    if start_date > end_date {
        return Err(Error::BadRequest(
            "start_date must not be after end_date".into(),
        ));
    }

    let (scope_period, raw_key) = if explicit {
        (
            None,
            format!(
                "city={}|start={}|end={}",
                city_key,
                start_date.to_rfc3339(),
                end_date.to_rfc3339()
            ),
        )
    } else {
        (
            Some(period.to_string()),
            format!("city={}|period={}", city_key, period),
        )
    };

    Ok(ResolvedScope {
        filter: WeatherLogFilter {
            city: city.clone(),
            start_date: Some(start_date),
            end_date: Some(end_date),
        },
        scope: InsightScope {
            city,
            period: scope_period,
            start_date,
            end_date,
        },
        cache_key: (!open_ended).then(|| sha256_hex(&raw_key)),
    })
}

pub fn build_report(
    scope: InsightScope,
    stats: WeatherStatistics,
    logs: &[WeatherLog],
    ai_summary: Option<String>,
    generated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> InsightReport {
    let patterns = detect_patterns(logs);
    let recommendations = recommendations(&stats, &patterns);
    let summary = summary(&stats, &patterns);
    InsightReport {
        scope,
        summary,
        statistics: stats,
        patterns,
        recommendations,
        ai_summary,
        generated_at,
        expires_at,
        cached: false,
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Newer half minus older half; `values` is newest first.
fn trend(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let (recent, older) = values.split_at(values.len() / 2);
    average(recent) - average(older)
}

/// Aggregates readings given newest first. `None` for an empty slice.
pub fn statistics(logs: &[WeatherLog]) -> Option<WeatherStatistics> {
    let newest = logs.first()?;
    let oldest = logs.last()?;

    let temps: Vec<f64> = logs.iter().map(|l| l.temperature).collect();
    let hums: Vec<f64> = logs.iter().map(|l| l.humidity).collect();
    let winds: Vec<f64> = logs.iter().map(|l| l.wind_speed).collect();
    let precip: Vec<f64> = logs.iter().map(|l| l.precipitation.unwrap_or(0.0)).collect();

    Some(WeatherStatistics {
        temperature: TemperatureStats {
            current: newest.temperature,
            avg: average(&temps),
            min: min_of(&temps),
            max: max_of(&temps),
            median: median(&temps),
            trend: trend(&temps),
        },
        humidity: HumidityStats {
            current: newest.humidity,
            avg: average(&hums),
            min: min_of(&hums),
            max: max_of(&hums),
            median: median(&hums),
        },
        wind_speed: WindStats {
            current: newest.wind_speed,
            avg: average(&winds),
            min: min_of(&winds),
            max: max_of(&winds),
        },
        precipitation: PrecipitationStats {
            total: precip.iter().sum(),
            avg: average(&precip),
            max: max_of(&precip),
        },
        period: PeriodStats {
            start: oldest.recorded_at,
            end: newest.recorded_at,
            records: logs.len(),
        },
    })
}

pub fn detect_patterns(logs: &[WeatherLog]) -> Vec<WeatherPattern> {
    let mut patterns = Vec::new();
    if logs.is_empty() {
        return patterns;
    }

    let recent = &logs[..logs.len().min(PATTERN_WINDOW)];
    let older = &logs[logs.len().saturating_sub(PATTERN_WINDOW)..];

    let recent_temps: Vec<f64> = recent.iter().map(|l| l.temperature).collect();
    let older_temps: Vec<f64> = older.iter().map(|l| l.temperature).collect();
    let temp_change = average(&recent_temps) - average(&older_temps);
    if temp_change.abs() > 2.0 {
        patterns.push(WeatherPattern {
            kind: "temperature_trend".into(),
            description: if temp_change > 0.0 {
                "Warming trend".into()
            } else {
                "Cooling trend".into()
            },
            value: format!("{:+.1}°C", temp_change),
            severity: if temp_change.abs() > 5.0 {
                Severity::High
            } else {
                Severity::Medium
            },
        });
    }

    let avg_humidity = average(&recent.iter().map(|l| l.humidity).collect::<Vec<_>>());
    if avg_humidity > 80.0 {
        patterns.push(WeatherPattern {
            kind: "high_humidity".into(),
            description: "Persistent high humidity".into(),
            value: format!("{:.0}%", avg_humidity),
            severity: Severity::Medium,
        });
    }

    let max_wind = max_of(&recent.iter().map(|l| l.wind_speed).collect::<Vec<_>>());
    if max_wind > 40.0 {
        patterns.push(WeatherPattern {
            kind: "strong_winds".into(),
            description: "Strong winds detected".into(),
            value: format!("{:.1} km/h", max_wind),
            severity: Severity::High,
        });
    }

    let total_precip: f64 = recent.iter().map(|l| l.precipitation.unwrap_or(0.0)).sum();
    if total_precip > 10.0 {
        patterns.push(WeatherPattern {
            kind: "heavy_precipitation".into(),
            description: "Significant precipitation".into(),
            value: format!("{:.1} mm", total_precip),
            severity: Severity::High,
        });
    }

    patterns
}

pub fn recommendations(stats: &WeatherStatistics, patterns: &[WeatherPattern]) -> Vec<String> {
    let mut out = Vec::new();

    if stats.temperature.current > 30.0 {
        out.push("High temperature. Stay hydrated and avoid long sun exposure.".to_string());
    } else if stats.temperature.current < 15.0 {
        out.push("Low temperature. Wear clothes suited for the cold.".to_string());
    }
    if stats.humidity.current > 80.0 {
        out.push("High humidity. It may feel stuffy.".to_string());
    }
    if stats.wind_speed.current > 30.0 {
        out.push("Strong winds. Take care outdoors.".to_string());
    }
    if stats.precipitation.total > 5.0 {
        out.push("Significant precipitation. Carry an umbrella.".to_string());
    }
    for pattern in patterns.iter().filter(|p| p.severity == Severity::High) {
        out.push(format!("{}: {}", pattern.description, pattern.value));
    }

    out
}

fn condition_label(temp: f64, humidity: f64) -> &'static str {
    if temp > 30.0 && humidity < 40.0 {
        "hot and dry"
    } else if temp > 25.0 && humidity > 70.0 {
        "hot and humid"
    } else if temp < 15.0 {
        "cold"
    } else if humidity > 80.0 {
        "humid"
    } else {
        "mild"
    }
}

pub fn summary(stats: &WeatherStatistics, patterns: &[WeatherPattern]) -> String {
    let condition = condition_label(stats.temperature.current, stats.humidity.current);
    let direction = if stats.temperature.trend > 0.0 {
        "warming"
    } else {
        "cooling"
    };
    let mut text = format!(
        "Conditions are {}. Current temperature is {:.1}°C, {} compared to earlier readings.",
        condition, stats.temperature.current, direction
    );
    if !patterns.is_empty() {
        text.push_str(&format!(" {} relevant pattern(s) detected.", patterns.len()));
    }
    text
}

fn temperature_factor(temp: f64) -> (f64, FactorStatus) {
    if (20.0..=26.0).contains(&temp) {
        (0.0, FactorStatus::Ideal)
    } else if temp < 20.0 {
        (-((20.0 - temp) * 2.0).min(30.0), FactorStatus::Low)
    } else {
        (-((temp - 26.0) * 2.0).min(30.0), FactorStatus::High)
    }
}

fn humidity_factor(humidity: f64) -> (f64, FactorStatus) {
    if (40.0..=60.0).contains(&humidity) {
        (0.0, FactorStatus::Ideal)
    } else if humidity < 40.0 {
        (-((40.0 - humidity) * 0.5).min(20.0), FactorStatus::Low)
    } else {
        (-((humidity - 60.0) * 0.5).min(20.0), FactorStatus::High)
    }
}

fn wind_factor(wind: f64) -> (f64, FactorStatus) {
    if (5.0..=15.0).contains(&wind) {
        (0.0, FactorStatus::Ideal)
    } else if wind < 5.0 {
        (-((5.0 - wind) * 2.0).min(10.0), FactorStatus::Low)
    } else {
        (-(wind - 15.0).min(15.0), FactorStatus::High)
    }
}

pub fn comfort_index(temperature: f64, humidity: f64, wind_speed: f64) -> ComfortIndex {
    let (t_contrib, t_status) = temperature_factor(temperature);
    let (h_contrib, h_status) = humidity_factor(humidity);
    let (w_contrib, w_status) = wind_factor(wind_speed);

    let score = (100.0 + t_contrib + h_contrib + w_contrib).clamp(0.0, 100.0);
    let classification = if score >= 80.0 {
        ComfortClass::VeryComfortable
    } else if score >= 60.0 {
        ComfortClass::Comfortable
    } else if score >= 40.0 {
        ComfortClass::Uncomfortable
    } else {
        ComfortClass::VeryUncomfortable
    };

    let mut recs = Vec::new();
    if temperature < 18.0 {
        recs.push("Wear warm clothes".to_string());
    } else if temperature > 30.0 {
        recs.push("Wear light clothing".to_string());
        recs.push("Avoid prolonged sun exposure".to_string());
    } else if temperature > 26.0 {
        recs.push("Use sunscreen".to_string());
    }
    if humidity < 30.0 {
        recs.push("Stay well hydrated".to_string());
    } else if humidity > 70.0 {
        recs.push("The air may feel stuffy".to_string());
        if temperature > 25.0 {
            recs.push("Look for air-conditioned places".to_string());
        }
    }
    if wind_speed > 30.0 {
        recs.push("Watch out for loose objects".to_string());
    } else if wind_speed < 3.0 {
        recs.push("Still air, ventilate indoor spaces".to_string());
    }
    match classification {
        ComfortClass::VeryComfortable => {
            recs.push("Ideal conditions for outdoor activities".to_string())
        }
        ComfortClass::VeryUncomfortable => recs.push("Avoid intense physical activity".to_string()),
        _ => {}
    }

    ComfortIndex {
        score: score.round() as i64,
        classification,
        factors: ComfortFactors {
            temperature: ComfortFactor {
                value: temperature,
                contribution: t_contrib.round() as i64,
                status: t_status,
            },
            humidity: ComfortFactor {
                value: humidity,
                contribution: h_contrib.round() as i64,
                status: h_status,
            },
            wind_speed: ComfortFactor {
                value: wind_speed,
                contribution: w_contrib.round() as i64,
                status: w_status,
            },
        },
        recommendations: recs,
    }
}
