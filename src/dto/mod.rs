pub mod auth_dto;
pub mod explorer_dto;
pub mod insight_dto;
pub mod location_dto;
pub mod user_dto;
pub mod weather_dto;
