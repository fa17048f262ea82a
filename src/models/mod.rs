pub mod insight_cache;
pub mod user;
pub mod weather_log;
