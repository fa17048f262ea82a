use crate::dto::location_dto::{GeoLocation, LocationSearchQuery, LocationSearchResponse, PostalAddress};
use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const DEFAULT_MATCHES: u32 = 5;
const MAX_MATCHES: u32 = 20;

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    admin1: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
    timezone: Option<String>,
}

impl From<GeocodingResult> for GeoLocation {
    fn from(r: GeocodingResult) -> Self {
        Self {
            name: r.name,
            latitude: r.latitude,
            longitude: r.longitude,
            state: r.admin1,
            country: r.country,
            country_code: r.country_code,
            timezone: r.timezone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    cep: Option<String>,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    ibge: Option<String>,
    // ViaCEP answers unknown codes with `"erro": true` (or `"true"`)
    #[serde(default)]
    erro: serde_json::Value,
}

impl ViaCepResponse {
    fn is_missing(&self) -> bool {
        match &self.erro {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// Place lookups over the Open-Meteo geocoding API and ViaCEP.
#[derive(Clone)]
pub struct LocationService {
    client: Client,
    geocoding_url: String,
    viacep_url: String,
}

/// Eight digits once punctuation is stripped, or `None`.
pub fn normalize_cep(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    (digits.len() == 8).then_some(digits)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Brazilian matches first, upstream relevance order otherwise.
fn brazil_first(results: &mut [GeoLocation]) {
    results.sort_by_key(|r| r.country_code.as_deref() != Some("BR"));
}

impl LocationService {
    pub fn new(client: Client, geocoding_url: String, viacep_url: String) -> Self {
        Self {
            client,
            geocoding_url,
            viacep_url: viacep_url.trim_end_matches('/').to_string(),
        }
    }

    async fn geocode(&self, name: &str, count: u32) -> Result<Vec<GeoLocation>> {
        let body = self
            .client
            .get(&self.geocoding_url)
            .query(&[
                ("name", name.to_string()),
                ("count", count.to_string()),
                ("language", "pt".to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<GeocodingResponse>()
            .await?;

        let mut results: Vec<GeoLocation> = body.results.into_iter().map(Into::into).collect();
        brazil_first(&mut results);
        Ok(results)
    }

    pub async fn search(&self, query: &LocationSearchQuery) -> Result<LocationSearchResponse> {
        let Some(name) = non_empty(query.q.clone()) else {
            return Err(Error::BadRequest("q is required".into()));
        };
        let count = query.count.unwrap_or(DEFAULT_MATCHES).clamp(1, MAX_MATCHES);

        let results = self.geocode(&name, count).await?;
        tracing::debug!(query = %name, matches = results.len(), "geocoding search");
        Ok(LocationSearchResponse {
            query: name,
            results,
        })
    }

    /// Resolves a CEP; the coordinates are best effort.
    pub async fn by_cep(&self, raw: &str) -> Result<PostalAddress> {
        let cep = normalize_cep(raw)
            .ok_or_else(|| Error::BadRequest("CEP must have 8 digits".into()))?;

        let res = self
            .client
            .get(format!("{}/{}/json/", self.viacep_url, cep))
            .send()
            .await?;
        if res.status() == StatusCode::BAD_REQUEST {
            return Err(Error::BadRequest(format!("CEP '{}' is malformed", cep)));
        }
        let body: ViaCepResponse = res.error_for_status()?.json().await?;
        if body.is_missing() {
            return Err(Error::NotFound(format!("CEP '{}' not found", cep)));
        }

        let city = non_empty(body.localidade)
            .ok_or_else(|| anyhow::anyhow!("ViaCEP response for {} has no city", cep))?;
        let state = non_empty(body.uf).unwrap_or_default();

        let location = match self.geocode(&city, MAX_MATCHES).await {
            Ok(matches) => pick_city(matches, &state),
            Err(e) => {
                tracing::warn!(error = %e, cep = %cep, "geocoding for CEP failed");
                None
            }
        };

        Ok(PostalAddress {
            cep: non_empty(body.cep).unwrap_or(cep),
            street: non_empty(body.logradouro),
            district: non_empty(body.bairro),
            city,
            state,
            ibge_code: non_empty(body.ibge),
            country_code: "BR".to_string(),
            location,
        })
    }
}

/// First Brazilian match, preferring one whose state name maps to `uf`.
fn pick_city(matches: Vec<GeoLocation>, uf: &str) -> Option<GeoLocation> {
    let mut brazilian = matches
        .into_iter()
        .filter(|m| m.country_code.as_deref() == Some("BR"))
        .peekable();
    let first = brazilian.peek().cloned();
    brazilian
        .find(|m| m.state.as_deref().and_then(state_code) == Some(uf))
        .or(first)
}

/// Two-letter code of a Brazilian state name.
pub fn state_code(name: &str) -> Option<&'static str> {
    let code = match name {
        "Acre" => "AC",
        "Alagoas" => "AL",
        "Amapá" => "AP",
        "Amazonas" => "AM",
        "Bahia" => "BA",
        "Ceará" => "CE",
        "Distrito Federal" | "Federal District" => "DF",
        "Espírito Santo" => "ES",
        "Goiás" => "GO",
        "Maranhão" => "MA",
        "Mato Grosso" => "MT",
        "Mato Grosso do Sul" => "MS",
        "Minas Gerais" => "MG",
        "Pará" => "PA",
        "Paraíba" => "PB",
        "Paraná" => "PR",
        "Pernambuco" => "PE",
        "Piauí" => "PI",
        "Rio de Janeiro" => "RJ",
        "Rio Grande do Norte" => "RN",
        "Rio Grande do Sul" => "RS",
        "Rondônia" => "RO",
        "Roraima" => "RR",
        "Santa Catarina" => "SC",
        "São Paulo" => "SP",
        "Sergipe" => "SE",
        "Tocantins" => "TO",
        _ => return None,
    };
    Some(code)
}
