mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use weather_backend::{
    database::pool::create_lazy_pool,
    dto::{
        explorer_dto::{PokemonListQuery, StarWarsQuery},
        location_dto::LocationSearchQuery,
    },
    error::Error,
    models::weather_log::WeatherLog,
    services::{
        ai_service::AIService, collector_service::CollectorService,
        explorer_service::ExplorerService, insight_service::statistics,
        location_service::LocationService, weather_service::WeatherService,
    },
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{body_json, get, test_app, test_config, DATABASE_URL};

fn readings() -> Vec<WeatherLog> {
    (0..6)
        .map(|i| {
            let at = Utc::now() - Duration::hours(i);
            WeatherLog {
                id: Uuid::new_v4(),
                recorded_at: at,
                city: Some("Palmas".into()),
                latitude: None,
                longitude: None,
                temperature: 31.0 - i as f64,
                apparent_temperature: None,
                humidity: 45.0,
                pressure: None,
                wind_speed: 7.0,
                wind_direction: None,
                precipitation: None,
                rain_probability: None,
                cloud_cover: None,
                weather_code: None,
                condition: None,
                created_at: at,
            }
        })
        .collect()
}

fn explorer(server: &MockServer) -> ExplorerService {
    ExplorerService::new(
        Client::new(),
        format!("{}/api/v2", server.uri()),
        format!("{}/api", server.uri()),
    )
}

#[tokio::test]
async fn narrative_comes_from_chat_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "test-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Hot afternoon ahead.  " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ai = AIService::new(
        format!("{}/v1/chat/completions", server.uri()),
        Some("test-key".into()),
        "test-model".into(),
        Client::new(),
    );
    let logs = readings();
    let stats = statistics(&logs).unwrap();
    let text = ai.narrate_weather(&stats, &logs).await;
    assert_eq!(text.as_deref(), Some("Hot afternoon ahead."));
}

#[tokio::test]
async fn narrative_failure_degrades_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let ai = AIService::new(server.uri(), Some("k".into()), "m".into(), Client::new());
    let logs = readings();
    let stats = statistics(&logs).unwrap();
    assert!(ai.narrate_weather(&stats, &logs).await.is_none());

    let disabled = AIService::new(server.uri(), None, "m".into(), Client::new());
    assert!(!disabled.is_enabled());
    assert!(disabled.narrate_weather(&stats, &logs).await.is_none());
}

#[tokio::test]
async fn pokemon_page_maps_ids_and_meta() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1302,
            "results": [
                { "name": "spearow", "url": "https://pokeapi.co/api/v2/pokemon/21/" },
                { "name": "fearow", "url": "https://pokeapi.co/api/v2/pokemon/22/" }
            ]
        })))
        .mount(&server)
        .await;

    let page = explorer(&server)
        .list_pokemon(&PokemonListQuery {
            page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items[0].id, 21);
    assert_eq!(page.items[1].name, "fearow");
    assert_eq!(page.meta.total, 1302);
    assert!(page.meta.has_previous);
}

#[tokio::test]
async fn pokemon_search_loads_names_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "results": [
                { "name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon/25/" },
                { "name": "raichu", "url": "https://pokeapi.co/api/v2/pokemon/26/" },
                { "name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = explorer(&server);
    let query = PokemonListQuery {
        search: Some("CHU".into()),
        ..Default::default()
    };
    let first = service.list_pokemon(&query).await.unwrap();
    let second = service.list_pokemon(&query).await.unwrap();
    assert_eq!(first.meta.total, 2);
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.items[1].id, 26);

    let far = service
        .list_pokemon(&PokemonListQuery {
            search: Some("chu".into()),
            page: Some(i64::MAX),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(far.items.is_empty());
    assert_eq!(far.meta.total, 2);
}

#[tokio::test]
async fn pokemon_detail_and_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/pikachu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "sprites": {
                "front_default": "front.png",
                "other": { "official-artwork": { "front_default": "art.png" } }
            },
            "types": [{ "slot": 1, "type": { "name": "electric", "url": "u" } }],
            "abilities": [{ "ability": { "name": "static", "url": "u" }, "is_hidden": false }],
            "stats": [{ "base_stat": 90, "effort": 2, "stat": { "name": "speed", "url": "u" } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/missingno"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let service = explorer(&server);
    let detail = service.pokemon_detail("Pikachu").await.unwrap();
    assert_eq!(detail.id, 25);
    assert_eq!(detail.image.as_deref(), Some("art.png"));
    assert_eq!(detail.types, vec!["electric"]);
    assert_eq!(detail.stats[0].value, 90);

    let err = service.pokemon_detail("missingno").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn upstream_outage_is_a_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = explorer(&server)
        .starwars_people(&StarWarsQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn starwars_people_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/people/"))
        .and(query_param("page", "1"))
        .and(query_param("search", "sky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "next": null,
            "previous": null,
            "results": [{
                "name": "Luke Skywalker",
                "height": "172",
                "mass": "77",
                "hair_color": "blond",
                "gender": "male",
                "birth_year": "19BBY"
            }]
        })))
        .mount(&server)
        .await;

    let page = explorer(&server)
        .starwars_people(&StarWarsQuery {
            page: None,
            search: Some(" sky ".into()),
        })
        .await
        .unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.page, 1);
    assert!(!page.has_next);
    assert_eq!(page.results[0].birth_year, "19BBY");
}

#[tokio::test]
async fn explorer_routes_are_public() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/pokemon/eevee"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 133, "name": "eevee", "height": 3, "weight": 65
        })))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.pokeapi_url = format!("{}/api/v2", server.uri());
    let (app, _) = test_app(&config);

    let resp = app.oneshot(get("/explorer/pokemon/eevee", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], 133);
    assert_eq!(body["types"], json!([]));
}

#[tokio::test]
async fn open_meteo_reading_is_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "-10.18"))
        .and(query_param("longitude", "-48.33"))
        .and(query_param("hourly", "precipitation_probability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": -10.18,
            "longitude": -48.33,
            "current": {
                "time": "2025-12-04T15:00",
                "interval": 900,
                "temperature_2m": 33.2,
                "relative_humidity_2m": 41,
                "apparent_temperature": 35.0,
                "precipitation": 0.0,
                "weather_code": 2,
                "cloud_cover": 40,
                "pressure_msl": 1009.9,
                "wind_speed_10m": 8.3,
                "wind_direction_10m": 120
            },
            "hourly": { "time": ["2025-12-04T15:00"], "precipitation_probability": [12] }
        })))
        .mount(&server)
        .await;

    let pool = create_lazy_pool(DATABASE_URL).unwrap();
    let collector = CollectorService::new(
        Client::new(),
        format!("{}/v1/forecast", server.uri()),
        WeatherService::new(pool),
        None,
    );
    assert!(!collector.is_configured());

    let payload = collector
        .fetch_current(-10.18, -48.33, Some("Palmas"))
        .await
        .unwrap();
    assert_eq!(payload.temperature, 33.2);
    assert_eq!(payload.rain_probability, Some(12.0));
    assert_eq!(payload.location.city.as_deref(), Some("Palmas"));
    assert_eq!(payload.timestamp.to_rfc3339(), "2025-12-04T15:00:00+00:00");

    let err = collector.collect_once().await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

fn locations(server: &MockServer) -> LocationService {
    LocationService::new(
        Client::new(),
        format!("{}/v1/search", server.uri()),
        format!("{}/ws/", server.uri()),
    )
}

fn palmas_matches() -> serde_json::Value {
    json!({
        "results": [
            {
                "name": "Las Palmas", "latitude": 28.1, "longitude": -15.41,
                "admin1": "Canarias", "country": "Espanha", "country_code": "ES",
                "timezone": "Atlantic/Canary"
            },
            {
                "name": "Palmas", "latitude": -10.18, "longitude": -48.33,
                "admin1": "Tocantins", "country": "Brasil", "country_code": "BR",
                "timezone": "America/Araguaina"
            },
            {
                "name": "Palmas", "latitude": -26.48, "longitude": -51.99,
                "admin1": "Paraná", "country": "Brasil", "country_code": "BR",
                "timezone": "America/Sao_Paulo"
            }
        ],
        "generationtime_ms": 0.5
    })
}

#[tokio::test]
async fn location_search_puts_brazil_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Palmas"))
        .and(query_param("count", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(palmas_matches()))
        .expect(1)
        .mount(&server)
        .await;

    let found = locations(&server)
        .search(&LocationSearchQuery {
            q: Some(" Palmas ".into()),
            count: Some(50),
        })
        .await
        .unwrap();
    assert_eq!(found.query, "Palmas");
    assert_eq!(found.results.len(), 3);
    assert_eq!(found.results[0].state.as_deref(), Some("Tocantins"));
    assert_eq!(found.results[2].country_code.as_deref(), Some("ES"));
}

#[tokio::test]
async fn location_search_without_matches_or_term() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generationtime_ms": 0.2 })))
        .mount(&server)
        .await;

    let service = locations(&server);
    let found = service
        .search(&LocationSearchQuery {
            q: Some("Atlantis".into()),
            count: None,
        })
        .await
        .unwrap();
    assert!(found.results.is_empty());

    let err = service.search(&LocationSearchQuery::default()).await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn cep_resolves_address_and_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/85555000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cep": "85555-000",
            "logradouro": "",
            "complemento": "",
            "bairro": "",
            "localidade": "Palmas",
            "uf": "PR",
            "ibge": "4117602",
            "ddd": "46"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Palmas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(palmas_matches()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ws/99999999/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "erro": "true" })))
        .mount(&server)
        .await;

    let service = locations(&server);
    let address = service.by_cep("85555-000").await.unwrap();
    assert_eq!(address.city, "Palmas");
    assert_eq!(address.state, "PR");
    assert_eq!(address.street, None);
    assert_eq!(address.ibge_code.as_deref(), Some("4117602"));
    let location = address.location.unwrap();
    assert_eq!(location.latitude, -26.48);

    let err = service.by_cep("99999-999").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = service.by_cep("123").await.unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)));
}

#[tokio::test]
async fn cep_survives_geocoding_outage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ws/01001000/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let address = locations(&server).by_cep("01001000").await.unwrap();
    assert_eq!(address.street.as_deref(), Some("Praça da Sé"));
    assert!(address.location.is_none());
}

#[tokio::test]
async fn location_routes_are_public() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(palmas_matches()))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.geocoding_url = format!("{}/v1/search", server.uri());
    let (app, _) = test_app(&config);

    let resp = app
        .clone()
        .oneshot(get("/explorer/locations?q=Palmas&count=3", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["results"][0]["country_code"], "BR");

    let resp = app
        .oneshot(get("/explorer/locations/cep/abc", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(resp).await["error"].is_string());
}
