use crate::dto::explorer_dto::{
    PokemonDetail, PokemonListQuery, PokemonListResponse, PokemonStat, PokemonSummary,
    StarWarsPeopleResponse, StarWarsPerson, StarWarsQuery,
};
use crate::error::{Error, Result};
use crate::utils::pagination::Pagination;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;

const SEARCH_POOL_SIZE: usize = 1000;

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct PokemonPage {
    count: i64,
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct PokemonRaw {
    id: i64,
    name: String,
    height: i64,
    weight: i64,
    #[serde(default)]
    sprites: serde_json::Value,
    #[serde(default)]
    types: Vec<TypeSlot>,
    #[serde(default)]
    abilities: Vec<AbilitySlot>,
    #[serde(default)]
    stats: Vec<StatSlot>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct AbilitySlot {
    ability: NamedResource,
}

#[derive(Debug, Deserialize)]
struct StatSlot {
    base_stat: i64,
    stat: NamedResource,
}

#[derive(Debug, Deserialize)]
struct PeoplePage {
    count: i64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<StarWarsPerson>,
}

/// Read-only proxy over PokeAPI and SWAPI.
#[derive(Clone)]
pub struct ExplorerService {
    client: Client,
    pokeapi_url: String,
    swapi_url: String,
    search_pool: Arc<OnceCell<Vec<PokemonSummary>>>,
}

fn pokemon_id(url: &str) -> i64 {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn summarize(resource: NamedResource) -> PokemonSummary {
    PokemonSummary {
        id: pokemon_id(&resource.url),
        name: resource.name,
        url: resource.url,
    }
}

fn artwork(sprites: &serde_json::Value) -> Option<String> {
    sprites
        .pointer("/other/official-artwork/front_default")
        .and_then(|v| v.as_str())
        .or_else(|| sprites.get("front_default").and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl ExplorerService {
    pub fn new(client: Client, pokeapi_url: String, swapi_url: String) -> Self {
        Self {
            client,
            pokeapi_url: pokeapi_url.trim_end_matches('/').to_string(),
            swapi_url: swapi_url.trim_end_matches('/').to_string(),
            search_pool: Arc::new(OnceCell::new()),
        }
    }

    async fn pokemon_page(&self, limit: i64, offset: i64) -> Result<PokemonPage> {
        let page = self
            .client
            .get(format!("{}/pokemon", self.pokeapi_url))
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?
            .error_for_status()?
            .json::<PokemonPage>()
            .await?;
        Ok(page)
    }

    pub async fn list_pokemon(&self, query: &PokemonListQuery) -> Result<PokemonListResponse> {
        let pagination = Pagination::new(query.page, query.limit);
        let search = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let Some(term) = search else {
            let page = self.pokemon_page(pagination.limit, pagination.offset()).await?;
            return Ok(PokemonListResponse {
                items: page.results.into_iter().map(summarize).collect(),
                meta: pagination.meta(page.count),
            });
        };

        let pool = self
            .search_pool
            .get_or_try_init(|| async {
                let page = self.pokemon_page(SEARCH_POOL_SIZE as i64, 0).await?;
                tracing::debug!(count = page.results.len(), "loaded pokemon search pool");
                Ok::<_, Error>(page.results.into_iter().map(summarize).collect())
            })
            .await?;

        let matches: Vec<&PokemonSummary> = pool.iter().filter(|p| p.name.contains(&term)).collect();
        let items = matches
            .iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(pagination.limit as usize)
            .map(|p| (*p).clone())
            .collect();

        Ok(PokemonListResponse {
            items,
            meta: pagination.meta(matches.len() as i64),
        })
    }

    pub async fn pokemon_detail(&self, name: &str) -> Result<PokemonDetail> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Err(Error::BadRequest("Pokemon name is required".into()));
        }

        let res = self
            .client
            .get(format!("{}/pokemon/{}", self.pokeapi_url, key))
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("Pokemon '{}' not found", key)));
        }
        let raw: PokemonRaw = res.error_for_status()?.json().await?;

        Ok(PokemonDetail {
            id: raw.id,
            image: artwork(&raw.sprites),
            name: raw.name,
            height: raw.height,
            weight: raw.weight,
            types: raw.types.into_iter().map(|t| t.kind.name).collect(),
            abilities: raw.abilities.into_iter().map(|a| a.ability.name).collect(),
            stats: raw
                .stats
                .into_iter()
                .map(|s| PokemonStat {
                    name: s.stat.name,
                    value: s.base_stat,
                })
                .collect(),
        })
    }

    pub async fn starwars_people(&self, query: &StarWarsQuery) -> Result<StarWarsPeopleResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let mut params = vec![("page", page.to_string())];
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }

        let res = self
            .client
            .get(format!("{}/people/", self.swapi_url))
            .query(&params)
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound("Page not found".into()));
        }
        let body: PeoplePage = res.error_for_status()?.json().await?;

        Ok(StarWarsPeopleResponse {
            count: body.count,
            page,
            has_next: body.next.is_some(),
            has_previous: body.previous.is_some(),
            results: body.results,
        })
    }
}
