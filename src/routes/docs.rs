use axum::{response::IntoResponse, Json};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::dto::{
    auth_dto::{AuthResponse, LoginPayload, RegisterPayload},
    explorer_dto::{
        PokemonDetail, PokemonListResponse, PokemonStat, PokemonSummary, StarWarsPeopleResponse,
        StarWarsPerson,
    },
    insight_dto::{
        ComfortClass, ComfortFactor, ComfortFactors, ComfortIndex, FactorStatus, HumidityStats,
        InsightReport, InsightScope, PeriodStats, PrecipitationStats, Severity, TemperatureStats,
        WeatherPattern, WeatherStatistics, WindStats,
    },
    location_dto::{GeoLocation, LocationSearchResponse, PostalAddress},
    user_dto::{
        CreateUserPayload, UpdateProfilePayload, UpdateUserPayload, UserListResponse,
        UserResponse,
    },
    weather_dto::{
        CreateWeatherLogPayload, DayClassification, LocationPayload, SortBy, SortOrder,
        WeatherLogListResponse,
    },
};
use crate::models::{user::Role, weather_log::WeatherLog};
use crate::utils::pagination::PageMeta;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::users::create_user,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::users::get_profile,
        crate::routes::users::update_profile,
        crate::routes::weather::create_weather_log,
        crate::routes::weather::list_weather_logs,
        crate::routes::weather::latest_weather_log,
        crate::routes::weather::latest_classification,
        crate::routes::weather::get_weather_log,
        crate::routes::insights::get_insights,
        crate::routes::insights::refresh_insights,
        crate::routes::insights::comfort_index,
        crate::routes::export::export_csv,
        crate::routes::export::export_xlsx,
        crate::routes::collector::collect_now,
        crate::routes::explorer::list_pokemon,
        crate::routes::explorer::get_pokemon,
        crate::routes::explorer::list_starwars_people,
        crate::routes::locations::search_locations,
        crate::routes::locations::lookup_cep,
    ),
    components(schemas(
        PageMeta,
        WeatherLog,
        LocationPayload,
        CreateWeatherLogPayload,
        SortBy,
        SortOrder,
        WeatherLogListResponse,
        DayClassification,
        InsightScope,
        TemperatureStats,
        HumidityStats,
        WindStats,
        PrecipitationStats,
        PeriodStats,
        WeatherStatistics,
        Severity,
        WeatherPattern,
        InsightReport,
        ComfortClass,
        FactorStatus,
        ComfortFactor,
        ComfortFactors,
        ComfortIndex,
        Role,
        CreateUserPayload,
        UpdateUserPayload,
        UpdateProfilePayload,
        UserResponse,
        UserListResponse,
        LoginPayload,
        RegisterPayload,
        AuthResponse,
        PokemonSummary,
        PokemonListResponse,
        PokemonStat,
        PokemonDetail,
        StarWarsPerson,
        StarWarsPeopleResponse,
        GeoLocation,
        LocationSearchResponse,
        PostalAddress,
    )),
    modifiers(&BearerAuth),
    info(title = "Weather backend", description = "Weather ingestion, insights and exports")
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[axum::debug_handler]
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
