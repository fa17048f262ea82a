use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_hours: i64,
    pub api_rps: u32,
    pub public_rps: u32,
    pub cors_origins: Vec<String>,
    pub export_max_rows: i64,
    pub ingest_api_key: Option<String>,
    pub insight_api_url: String,
    pub insight_api_key: Option<String>,
    pub insight_model: String,
    pub insight_cache_hours: i64,
    pub insight_refresh_cron: Option<String>,
    pub open_meteo_url: String,
    pub collector: Option<CollectorConfig>,
    pub pokeapi_url: String,
    pub swapi_url: String,
    pub geocoding_url: String,
    pub viacep_url: String,
    pub admin_seed: Option<AdminSeed>,
}

/// Location polled by the scheduled Open-Meteo collector.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub cron: String,
    pub city: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let collector = match (
            get_env_opt("COLLECTOR_CRON"),
            get_env_opt_parse::<f64>("COLLECTOR_LATITUDE")?,
            get_env_opt_parse::<f64>("COLLECTOR_LONGITUDE")?,
        ) {
            (Some(cron), Some(latitude), Some(longitude)) => Some(CollectorConfig {
                cron,
                city: get_env_opt("COLLECTOR_CITY"),
                latitude,
                longitude,
            }),
            _ => None,
        };

        let admin_seed = match (get_env_opt("ADMIN_EMAIL"), get_env_opt("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                password,
                name: get_env_or("ADMIN_NAME", "Administrator"),
            }),
            _ => None,
        };

        let cors_origins = get_env_opt("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:3000"),
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_expires_hours: get_env_parse_or("JWT_EXPIRES_HOURS", 24)?,
            api_rps: get_env_parse_or("API_RPS", 50)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 20)?,
            cors_origins,
            export_max_rows: get_env_parse_or("EXPORT_MAX_ROWS", 10_000)?,
            ingest_api_key: get_env_opt("INGEST_API_KEY"),
            insight_api_url: get_env_or(
                "INSIGHT_API_URL",
                "https://api.together.xyz/v1/chat/completions",
            ),
            insight_api_key: get_env_opt("INSIGHT_API_KEY"),
            insight_model: get_env_or(
                "INSIGHT_MODEL",
                "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
            ),
            insight_cache_hours: get_env_parse_or("INSIGHT_CACHE_HOURS", 6)?,
            insight_refresh_cron: get_env_opt("INSIGHT_REFRESH_CRON"),
            open_meteo_url: get_env_or("OPEN_METEO_URL", "https://api.open-meteo.com/v1/forecast"),
            collector,
            pokeapi_url: get_env_or("POKEAPI_URL", "https://pokeapi.co/api/v2"),
            swapi_url: get_env_or("SWAPI_URL", "https://swapi.dev/api"),
            geocoding_url: get_env_or(
                "GEOCODING_URL",
                "https://geocoding-api.open-meteo.com/v1/search",
            ),
            viacep_url: get_env_or("VIACEP_URL", "https://viacep.com.br/ws"),
            admin_seed,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn get_env_opt_parse<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_opt(name).map(|raw| parse_value(name, &raw)).transpose()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
