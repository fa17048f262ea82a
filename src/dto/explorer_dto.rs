use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::utils::pagination::PageMeta;

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct PokemonListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PokemonSummary {
    pub id: i64,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PokemonListResponse {
    pub items: Vec<PokemonSummary>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PokemonStat {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PokemonDetail {
    pub id: i64,
    pub name: String,
    pub height: i64,
    pub weight: i64,
    pub image: Option<String>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: Vec<PokemonStat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct StarWarsQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StarWarsPerson {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub gender: String,
    pub birth_year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StarWarsPeopleResponse {
    pub count: i64,
    pub page: i64,
    pub has_next: bool,
    pub has_previous: bool,
    pub results: Vec<StarWarsPerson>,
}
