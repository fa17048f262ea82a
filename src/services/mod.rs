pub mod ai_service;
pub mod auth_service;
pub mod collector_service;
pub mod explorer_service;
pub mod export_service;
pub mod insight_service;
pub mod location_service;
pub mod user_service;
pub mod weather_service;
