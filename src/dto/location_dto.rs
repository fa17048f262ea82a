use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct LocationSearchQuery {
    /// City or place name.
    pub q: Option<String>,
    /// Maximum matches, 1 to 20 (default 5).
    pub count: Option<u32>,
}

/// A geocoded place. Coordinates feed `location` on ingested readings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct GeoLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub state: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationSearchResponse {
    pub query: String,
    pub results: Vec<GeoLocation>,
}

/// A Brazilian postcode (CEP) resolved to its address and, when the city
/// geocodes, its coordinates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostalAddress {
    pub cep: String,
    pub street: Option<String>,
    pub district: Option<String>,
    pub city: String,
    pub state: String,
    pub ibge_code: Option<String>,
    pub country_code: String,
    pub location: Option<GeoLocation>,
}
