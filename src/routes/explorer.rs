use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::explorer_dto::{
        PokemonDetail, PokemonListQuery, PokemonListResponse, StarWarsPeopleResponse,
        StarWarsQuery,
    },
    error::Result,
    utils::extract::{AppPath, AppQuery},
    AppState,
};

#[utoipa::path(
    get,
    path = "/explorer/pokemon",
    params(PokemonListQuery),
    responses(
        (status = 200, description = "Page of Pokémon", body = PokemonListResponse),
        (status = 502, description = "PokeAPI unavailable")
    )
)]
#[axum::debug_handler]
pub async fn list_pokemon(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PokemonListQuery>,
) -> Result<impl IntoResponse> {
    let page = state.explorer_service.list_pokemon(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/explorer/pokemon/{name}",
    params(("name" = String, Path, description = "Pokémon name or number")),
    responses(
        (status = 200, description = "Pokémon detail", body = PokemonDetail),
        (status = 404, description = "Unknown Pokémon"),
        (status = 502, description = "PokeAPI unavailable")
    )
)]
#[axum::debug_handler]
pub async fn get_pokemon(
    State(state): State<AppState>,
    AppPath(name): AppPath<String>,
) -> Result<impl IntoResponse> {
    let detail = state.explorer_service.pokemon_detail(&name).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    get,
    path = "/explorer/starwars/people",
    params(StarWarsQuery),
    responses(
        (status = 200, description = "Page of characters", body = StarWarsPeopleResponse),
        (status = 502, description = "SWAPI unavailable")
    )
)]
#[axum::debug_handler]
pub async fn list_starwars_people(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StarWarsQuery>,
) -> Result<impl IntoResponse> {
    let page = state.explorer_service.starwars_people(&query).await?;
    Ok(Json(page))
}
