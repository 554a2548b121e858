use afrisearch_core::persist::load_dataset;
use afrisearch_core::{Country, Dataset};
use afrisearch_engines::config::Overrides;
use afrisearch_engines::{HttpRegistry, LayeredConfig, Orchestrator, Response, SettingsStore};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Everything `build_app` needs from the command line and environment.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub settings_path: PathBuf,
    pub dataset_path: Option<PathBuf>,
    pub deep_thinking: bool,
    pub overrides: Overrides,
    pub admin_token: Option<String>,
}

impl AppOptions {
    /// Reads `ADMIN_TOKEN` from the environment.
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            dataset_path: None,
            deep_thinking: true,
            overrides: Overrides::default(),
            admin_token: std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub took_s: f64,
    pub response: Response,
}

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsUpdate {
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub bing_api_key: Option<String>,
    #[serde(default)]
    pub clear: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub store: Arc<SettingsStore>,
    pub admin_token: Option<String>,
}

pub fn build_app(options: AppOptions) -> Result<Router> {
    let dataset = match &options.dataset_path {
        Some(path) => load_dataset(path)?,
        None => Dataset::builtin(),
    };
    let config = LayeredConfig::new()
        .with_settings_file(&options.settings_path)
        .with_overrides(options.overrides.clone());
    let registry = HttpRegistry::new(Arc::new(config))?;
    let orchestrator = Orchestrator::new(Arc::new(registry), Arc::new(dataset)).with_deep_thinking(options.deep_thinking);
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        store: Arc::new(SettingsStore::new(&options.settings_path)),
        admin_token: options.admin_token,
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/countries", get(countries_handler))
        .route("/providers", get(providers_handler))
        .route("/settings/credentials", put(credentials_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let query = params.q.trim();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "missing query parameter q".into()));
    }
    let start = std::time::Instant::now();
    let response = state.orchestrator.generate_response(query).await;
    let elapsed = start.elapsed();
    tracing::info!(query, path = ?response.path, took_ms = elapsed.as_millis() as u64, "search served");
    Ok(Json(SearchResponse { query: query.to_string(), took_ms: elapsed.as_millis(), took_s: elapsed.as_secs_f64(), response }))
}

pub async fn countries_handler(State(state): State<AppState>) -> Json<Vec<Country>> {
    Json(state.orchestrator.dataset().countries().to_vec())
}

pub async fn providers_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "active": state.orchestrator.active_engines(),
        "deep_thinking": state.orchestrator.uses_deep_thinking(),
    }))
}

async fn credentials_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<CredentialsUpdate>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let internal = |e: anyhow::Error| {
        tracing::warn!(error = %e, "could not save credentials");
        (StatusCode::INTERNAL_SERVER_ERROR, "could not save credentials".to_string())
    };

    if update.clear {
        state.store.clear_credentials().map_err(internal)?;
    }
    match (&update.google_api_key, &update.google_search_engine_id) {
        (Some(key), Some(cx)) => state.store.set_google_credentials(key, cx).map_err(internal)?,
        (None, None) => {}
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "google_api_key and google_search_engine_id must be set together".into(),
            ))
        }
    }
    if let Some(key) = &update.bing_api_key {
        state.store.set_bing_api_key(key).map_err(internal)?;
    }

    Ok(Json(serde_json::json!({ "active": state.orchestrator.active_engines() })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
