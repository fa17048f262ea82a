use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::location_dto::{LocationSearchQuery, LocationSearchResponse, PostalAddress},
    error::Result,
    utils::extract::{AppPath, AppQuery},
    AppState,
};

#[utoipa::path(
    get,
    path = "/explorer/locations",
    params(LocationSearchQuery),
    responses(
        (status = 200, description = "Matching places, Brazilian first", body = LocationSearchResponse),
        (status = 400, description = "Missing search term"),
        (status = 502, description = "Geocoding service unavailable")
    )
)]
#[axum::debug_handler]
pub async fn search_locations(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LocationSearchQuery>,
) -> Result<impl IntoResponse> {
    let found = state.location_service.search(&query).await?;
    Ok(Json(found))
}

#[utoipa::path(
    get,
    path = "/explorer/locations/cep/{cep}",
    params(("cep" = String, Path, description = "Brazilian postcode, with or without punctuation")),
    responses(
        (status = 200, description = "Address and coordinates", body = PostalAddress),
        (status = 400, description = "Malformed CEP"),
        (status = 404, description = "Unknown CEP"),
        (status = 502, description = "ViaCEP unavailable")
    )
)]
#[axum::debug_handler]
pub async fn lookup_cep(
    State(state): State<AppState>,
    AppPath(cep): AppPath<String>,
) -> Result<impl IntoResponse> {
    let address = state.location_service.by_cep(&cep).await?;
    Ok(Json(address))
}
