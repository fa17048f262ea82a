pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    ai_service::AIService,
    auth_service::AuthService,
    collector_service::{CollectTarget, CollectorService},
    explorer_service::ExplorerService,
    insight_service::InsightService,
    location_service::LocationService,
    user_service::UserService,
    weather_service::WeatherService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub ingest_api_key: Option<String>,
    pub export_max_rows: i64,
    pub weather_service: WeatherService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub ai_service: AIService,
    pub insight_service: InsightService,
    pub collector_service: CollectorService,
    pub explorer_service: ExplorerService,
    pub location_service: LocationService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!("weather-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let weather_service = WeatherService::new(pool.clone());
        let user_service = UserService::new(pool.clone());
        let auth_service = AuthService::new(
            user_service.clone(),
            config.jwt_secret.clone(),
            config.jwt_expires_hours,
        );
        let ai_service = AIService::new(
            config.insight_api_url.clone(),
            config.insight_api_key.clone(),
            config.insight_model.clone(),
            http_client.clone(),
        );
        let insight_service = InsightService::new(
            pool.clone(),
            weather_service.clone(),
            ai_service.clone(),
            config.insight_cache_hours,
        );
        let collector_service = CollectorService::new(
            http_client.clone(),
            config.open_meteo_url.clone(),
            weather_service.clone(),
            config.collector.as_ref().map(|c| CollectTarget {
                city: c.city.clone(),
                latitude: c.latitude,
                longitude: c.longitude,
            }),
        );
        let location_service = LocationService::new(
            http_client.clone(),
            config.geocoding_url.clone(),
            config.viacep_url.clone(),
        );
        let explorer_service = ExplorerService::new(
            http_client,
            config.pokeapi_url.clone(),
            config.swapi_url.clone(),
        );

        Ok(Self {
            ingest_api_key: config.ingest_api_key.clone(),
            export_max_rows: config.export_max_rows.max(1),
            weather_service,
            user_service,
            auth_service,
            ai_service,
            insight_service,
            collector_service,
            explorer_service,
            location_service,
        })
    }
}
