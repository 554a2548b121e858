use afrisearch_core::narrative::FixedTheme;
use afrisearch_core::{Dataset, Engine};
use afrisearch_engines::config::Overrides;
use afrisearch_engines::providers::bing::BingSearch;
use afrisearch_engines::providers::google::GoogleSearch;
use afrisearch_engines::{
    Aggregator, CallErrorKind, ConfigSource, HttpRegistry, LayeredConfig, Orchestrator, ProviderError, ResponsePath,
    SearchProvider, Settings, SettingsStore, StaticConfig,
};
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

async fn google(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("key").map(String::as_str) != Some("good-key") {
        return (StatusCode::FORBIDDEN, Json(json!({"error": {"code": 403, "message": "bad key"}}))).into_response();
    }
    assert_eq!(params.get("safe").map(String::as_str), Some("active"));
    let q = params.get("q").cloned().unwrap_or_default();
    Json(json!({"items": [
        {"title": format!("{q} in Nigeria"), "link": "https://news.example/ng", "snippet": "Nigeria fintech keeps growing."},
        {"title": "Kenya payments", "link": "https://news.example/ke", "snippet": "Kenya mobile money leads the region."}
    ]}))
    .into_response()
}

async fn bing(headers: HeaderMap) -> Response {
    match headers.get("Ocp-Apim-Subscription-Key").and_then(|v| v.to_str().ok()) {
        Some("throttled") => StatusCode::TOO_MANY_REQUESTS.into_response(),
        Some(key) => {
            if key == "slow" {
                tokio::time::sleep(Duration::from_millis(1500)).await;
            }
            Json(json!({"webPages": {"value": [
                {"name": "Nigeria startup funding", "url": "https://news.example/ng", "snippet": "Lagos leads."},
                {"name": "Ghana cocoa exports", "url": "https://news.example/gh", "snippet": "Ghana ships more cocoa."}
            ]}}))
            .into_response()
        }
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn duckduckgo() -> Json<serde_json::Value> {
    Json(json!({
        "Heading": "Renewable energy in Africa",
        "AbstractText": "Africa holds vast solar and wind potential.",
        "AbstractURL": "https://en.wikipedia.org/wiki/Renewable_energy_in_Africa",
        "RelatedTopics": []
    }))
}

async fn serve() -> String {
    let app = Router::new()
        .route("/google", get(google))
        .route("/bing", get(bing))
        .route("/ddg", get(duckduckgo));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn settings(base: &str) -> Settings {
    Settings {
        google_api_key: Some("good-key".into()),
        google_search_engine_id: Some("cx-1".into()),
        bing_api_key: Some("bing-key".into()),
        google_endpoint: format!("{base}/google"),
        bing_endpoint: format!("{base}/bing"),
        duckduckgo_endpoint: format!("{base}/ddg"),
        timeout_secs: 5,
        ..Settings::default()
    }
}

fn aggregator(settings: Settings) -> Aggregator {
    Aggregator::new(Arc::new(HttpRegistry::new(Arc::new(StaticConfig(settings))).unwrap()))
}

#[tokio::test]
async fn keyed_providers_fan_out_over_http() {
    let base = serve().await;
    let agg = aggregator(settings(&base)).search_all("fintech").await;

    assert_eq!(agg.total_results, 4);
    assert_eq!(agg.by_engine.len(), 2);
    assert_eq!(agg.by_engine[&Engine::Google][0].title, "fintech in Nigeria");
    assert_eq!(agg.by_engine[&Engine::Bing][1].url, "https://news.example/gh");
    assert!(!agg.by_engine.contains_key(&Engine::DuckDuckGo));
}

#[tokio::test]
async fn throttled_bing_is_rate_limited_and_isolated() {
    let base = serve().await;
    let s = Settings { bing_api_key: Some("throttled".into()), ..settings(&base) };

    let err = BingSearch::new(reqwest::Client::new(), &s).search("fintech").await.unwrap_err();
    assert_eq!(err.kind(), Some(CallErrorKind::RateLimited));

    let agg = aggregator(s).search_all("fintech").await;
    assert!(agg.by_engine[&Engine::Bing].is_empty());
    assert_eq!(agg.by_engine[&Engine::Google].len(), 2);
}

#[tokio::test]
async fn bad_google_key_is_unauthorized() {
    let base = serve().await;
    let s = Settings { google_api_key: Some("wrong".into()), ..settings(&base) };
    let err = GoogleSearch::new(reqwest::Client::new(), &s).search("fintech").await.unwrap_err();
    assert_eq!(err, ProviderError::call(Engine::Google, CallErrorKind::Unauthorized));
}

#[tokio::test]
async fn missing_credentials_are_unconfigured() {
    let s = Settings::default();
    let err = GoogleSearch::new(reqwest::Client::new(), &s).search("fintech").await.unwrap_err();
    assert_eq!(err, ProviderError::Unconfigured(Engine::Google));
    assert_eq!(err.kind(), None);
}

#[tokio::test]
async fn refused_connection_is_connect_error() {
    let s = Settings { google_endpoint: "http://127.0.0.1:1/google".into(), ..settings("http://unused") };
    let err = GoogleSearch::new(reqwest::Client::new(), &s).search("fintech").await.unwrap_err();
    assert_eq!(err.kind(), Some(CallErrorKind::Connect));
}

#[tokio::test]
async fn duckduckgo_stands_in_without_keys() {
    let base = serve().await;
    let s = Settings { google_api_key: None, bing_api_key: None, ..settings(&base) };
    let agg = aggregator(s).search_all("renewable energy").await;
    assert_eq!(agg.by_engine.keys().copied().collect::<Vec<_>>(), vec![Engine::DuckDuckGo]);
    assert_eq!(agg.all_items[0].title, "Renewable energy in Africa");
}

#[tokio::test]
async fn slow_bing_is_cut_off_by_its_own_request_timeout() {
    let base = serve().await;
    let s = Settings { bing_api_key: Some("slow".into()), timeout_secs: 1, ..settings(&base) };
    let err = BingSearch::new(reqwest::Client::new(), &s).search("cocoa").await.unwrap_err();
    assert_eq!(err.kind(), Some(CallErrorKind::Timeout));
}

/// Settings that can be swapped while a registry holds them.
struct Switchable(parking_lot::Mutex<Settings>);

impl ConfigSource for Switchable {
    fn resolve(&self) -> Settings { self.0.lock().clone() }
}

#[tokio::test]
async fn raised_timeout_applies_to_the_next_search() {
    let base = serve().await;
    let slow = Settings { google_api_key: None, bing_api_key: Some("slow".into()), timeout_secs: 1, ..settings(&base) };
    let config = Arc::new(Switchable(parking_lot::Mutex::new(slow.clone())));
    let agg = Aggregator::new(Arc::new(HttpRegistry::new(config.clone()).unwrap()));

    let cut_off = agg.search_all("cocoa").await;
    assert!(cut_off.by_engine[&Engine::Bing].is_empty());

    *config.0.lock() = Settings { timeout_secs: 3, ..slow };
    assert_eq!(agg.search_all("cocoa").await.total_results, 2);
}

#[tokio::test]
async fn saved_credentials_switch_providers_between_calls() {
    let base = serve().await;
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    let overrides = Overrides {
        google_endpoint: Some(format!("{base}/google")),
        bing_endpoint: Some(format!("{base}/bing")),
        duckduckgo_endpoint: Some(format!("{base}/ddg")),
        ..Overrides::default()
    };
    let config = LayeredConfig::new()
        .with_settings_file(&path)
        .with_env_prefix("AFRI_HTTP_TEST_")
        .with_overrides(overrides);
    let agg = aggregator_from(config);

    assert_eq!(agg.active_engines(), vec![Engine::DuckDuckGo]);
    SettingsStore::new(&path).set_bing_api_key("bing-key").unwrap();
    assert_eq!(agg.active_engines(), vec![Engine::Bing]);
    assert_eq!(agg.search_all("cocoa").await.total_results, 2);
}

fn aggregator_from(config: LayeredConfig) -> Aggregator {
    Aggregator::new(Arc::new(HttpRegistry::new(Arc::new(config)).unwrap()))
}

#[tokio::test]
async fn orchestrator_takes_the_deep_path_over_http() {
    let base = serve().await;
    let registry = HttpRegistry::new(Arc::new(StaticConfig(settings(&base)))).unwrap();
    let orch = Orchestrator::new(Arc::new(registry), Arc::new(Dataset::builtin()))
        .with_theme_chooser(Arc::new(FixedTheme(2)));

    let response = orch.generate_response("Nigeria fintech").await;
    assert_eq!(response.path, ResponsePath::Deep);
    assert_eq!(response.sources.len(), 3);
    assert!(response.sources.iter().all(|s| s.url.starts_with("https://news.example/")));
    assert_eq!(response.related_countries[0].name(), "Nigeria");
    assert!(!response.related_countries[0].links.is_empty());
}
