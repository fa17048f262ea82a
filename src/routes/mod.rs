pub mod auth;
pub mod collector;
pub mod docs;
pub mod explorer;
pub mod export;
pub mod health;
pub mod insights;
pub mod locations;
pub mod users;
pub mod weather;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{
    auth::{require_admin, require_auth},
    cors::cors_layer,
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::AppState;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Full HTTP surface with its middleware stack.
pub fn app(state: AppState, config: &Config) -> Router {
    let public_api = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/explorer/pokemon", get(explorer::list_pokemon))
        .route("/explorer/pokemon/:name", get(explorer::get_pokemon))
        .route(
            "/explorer/starwars/people",
            get(explorer::list_starwars_people),
        )
        .route("/explorer/locations", get(locations::search_locations))
        .route("/explorer/locations/cep/:cep", get(locations::lookup_cep))
        .layer(from_fn_with_state(
            new_rps_state(config.public_rps),
            rps_middleware,
        ));

    // guarded by the optional ingest key inside the handler
    let ingest_api = Router::new().route("/weather/logs", post(weather::create_weather_log));

    let user_api = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/users/me",
            get(users::get_profile).patch(users::update_profile),
        )
        .route("/weather/logs", get(weather::list_weather_logs))
        .route("/weather/logs/latest", get(weather::latest_weather_log))
        .route(
            "/weather/logs/latest/classification",
            get(weather::latest_classification),
        )
        .route("/weather/logs/:id", get(weather::get_weather_log))
        .route("/weather/insights", get(insights::get_insights))
        .route("/weather/comfort", get(insights::comfort_index))
        .route("/weather/export/csv", get(export::export_csv))
        .route("/weather/export/xlsx", get(export::export_xlsx))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin_api = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/weather/insights/refresh",
            post(insights::refresh_insights),
        )
        .route("/weather/collect", post(collector::collect_now))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let api = ingest_api
        .merge(user_api)
        .merge(admin_api)
        .layer(from_fn_with_state(
            new_rps_state(config.api_rps),
            rps_middleware,
        ));

    public_api
        .merge(api)
        .with_state(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}
