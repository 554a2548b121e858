//! Search backends behind one capability-style interface.

pub mod bing;
pub mod duckduckgo;
pub mod google;

use afrisearch_core::{Engine, SearchItem};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConfigSource, Settings};

/// Short, provider-independent reason a call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    BadRequest,
    Unauthorized,
    RateLimited,
    Timeout,
    Connect,
    Status(u16),
    Payload,
}

impl std::fmt::Display for CallErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallErrorKind::BadRequest => f.write_str("bad request"),
            CallErrorKind::Unauthorized => f.write_str("unauthorized"),
            CallErrorKind::RateLimited => f.write_str("rate limited"),
            CallErrorKind::Timeout => f.write_str("timed out"),
            CallErrorKind::Connect => f.write_str("connection failed"),
            CallErrorKind::Status(code) => write!(f, "http status {code}"),
            CallErrorKind::Payload => f.write_str("error payload"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    Unconfigured(Engine),
    #[error("{engine} search failed: {kind}")]
    Call { engine: Engine, kind: CallErrorKind },
}

impl ProviderError {
    pub fn call(engine: Engine, kind: CallErrorKind) -> Self {
        ProviderError::Call { engine, kind }
    }

    pub fn kind(&self) -> Option<CallErrorKind> {
        match self {
            ProviderError::Call { kind, .. } => Some(*kind),
            ProviderError::Unconfigured(_) => None,
        }
    }
}

pub fn classify_status(status: StatusCode) -> CallErrorKind {
    match status.as_u16() {
        400 => CallErrorKind::BadRequest,
        401 | 403 => CallErrorKind::Unauthorized,
        429 => CallErrorKind::RateLimited,
        code => CallErrorKind::Status(code),
    }
}

pub fn classify_transport(err: &reqwest::Error) -> CallErrorKind {
    if err.is_timeout() {
        CallErrorKind::Timeout
    } else if err.is_connect() {
        CallErrorKind::Connect
    } else if let Some(status) = err.status() {
        classify_status(status)
    } else if err.is_decode() {
        CallErrorKind::Payload
    } else {
        CallErrorKind::Connect
    }
}

/// GET `endpoint` and decode a JSON body, mapping every failure to a [`CallErrorKind`].
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    engine: Engine,
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let resp = request.send().await.map_err(|e| ProviderError::call(engine, classify_transport(&e)))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ProviderError::call(engine, classify_status(status)));
    }
    resp.json::<T>().await.map_err(|e| {
        tracing::debug!(%engine, error = %e, "undecodable response body");
        ProviderError::call(engine, CallErrorKind::Payload)
    })
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn engine(&self) -> Engine;

    /// `Ok(vec![])` means the backend answered with no results.
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    Bing,
    DuckDuckGo,
}

impl ProviderKind {
    pub fn engine(&self) -> Engine {
        match self {
            ProviderKind::Google => Engine::Google,
            ProviderKind::Bing => Engine::Bing,
            ProviderKind::DuckDuckGo => Engine::DuckDuckGo,
        }
    }
}

/// Providers usable under `settings`. DuckDuckGo only stands in when no keyed engine is set up.
pub fn active_providers(settings: &Settings) -> Vec<ProviderKind> {
    let mut kinds = Vec::new();
    if settings.google_credentials().is_some() {
        kinds.push(ProviderKind::Google);
    }
    if settings.bing_api_key().is_some() {
        kinds.push(ProviderKind::Bing);
    }
    if kinds.is_empty() && settings.duckduckgo_enabled {
        kinds.push(ProviderKind::DuckDuckGo);
    }
    kinds
}

/// Providers usable right now, with the bound for each call, from one settings resolution.
#[derive(Clone)]
pub struct ActiveProviders {
    pub providers: Vec<Arc<dyn SearchProvider>>,
    pub timeout: Duration,
}

impl ActiveProviders {
    pub fn is_empty(&self) -> bool { self.providers.is_empty() }

    pub fn engines(&self) -> Vec<Engine> {
        self.providers.iter().map(|p| p.engine()).collect()
    }
}

pub trait ProviderRegistry: Send + Sync {
    /// Recomputed on every call.
    fn active(&self) -> ActiveProviders;
}

/// Builds reqwest-backed adapters from freshly resolved settings.
pub struct HttpRegistry {
    config: Arc<dyn ConfigSource>,
    client: Client,
}

impl HttpRegistry {
    pub fn new(config: Arc<dyn ConfigSource>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("afrisearch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn settings(&self) -> Settings { self.config.resolve() }
}

impl ProviderRegistry for HttpRegistry {
    fn active(&self) -> ActiveProviders {
        let settings = self.config.resolve();
        let providers = active_providers(&settings)
            .into_iter()
            .map(|kind| -> Arc<dyn SearchProvider> {
                match kind {
                    ProviderKind::Google => Arc::new(google::GoogleSearch::new(self.client.clone(), &settings)),
                    ProviderKind::Bing => Arc::new(bing::BingSearch::new(self.client.clone(), &settings)),
                    ProviderKind::DuckDuckGo => Arc::new(duckduckgo::DuckDuckGoSearch::new(self.client.clone(), &settings)),
                }
            })
            .collect();
        ActiveProviders { providers, timeout: settings.timeout() }
    }
}

/// A fixed provider list, for tests and embedding.
pub struct StaticRegistry {
    providers: Vec<Arc<dyn SearchProvider>>,
    timeout: Duration,
}

impl StaticRegistry {
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>) -> Self {
        Self { providers, timeout: Settings::default().timeout() }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ProviderRegistry for StaticRegistry {
    fn active(&self) -> ActiveProviders {
        ActiveProviders { providers: self.providers.clone(), timeout: self.timeout }
    }
}
