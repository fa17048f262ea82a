use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct InsightQuery {
    pub city: Option<String>,
    /// One of `24h`, `7d`, `30d`.
    pub period: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct InsightScope {
    pub city: Option<String>,
    pub period: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TemperatureStats {
    pub current: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct HumidityStats {
    pub current: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct WindStats {
    pub current: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PrecipitationStats {
    pub total: f64,
    pub avg: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PeriodStats {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct WeatherStatistics {
    pub temperature: TemperatureStats,
    pub humidity: HumidityStats,
    pub wind_speed: WindStats,
    pub precipitation: PrecipitationStats,
    pub period: PeriodStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct WeatherPattern {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub value: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InsightReport {
    pub scope: InsightScope,
    pub summary: String,
    pub statistics: WeatherStatistics,
    pub patterns: Vec<WeatherPattern>,
    pub recommendations: Vec<String>,
    pub ai_summary: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct ComfortQuery {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComfortClass {
    VeryComfortable,
    Comfortable,
    Uncomfortable,
    VeryUncomfortable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Ideal,
    High,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ComfortFactor {
    pub value: f64,
    pub contribution: i64,
    pub status: FactorStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ComfortFactors {
    pub temperature: ComfortFactor,
    pub humidity: ComfortFactor,
    pub wind_speed: ComfortFactor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ComfortIndex {
    pub score: i64,
    pub classification: ComfortClass,
    pub factors: ComfortFactors,
    pub recommendations: Vec<String>,
}
