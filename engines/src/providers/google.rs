//! Google Custom Search JSON API.

use afrisearch_core::{Engine, SearchItem};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{get_json, CallErrorKind, ProviderError, SearchProvider};
use crate::config::Settings;

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
    error: Option<GoogleApiError>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    #[serde(rename = "htmlSnippet")]
    html_snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleApiError {
    message: Option<String>,
}

pub(crate) fn parse(resp: GoogleResponse) -> Result<Vec<SearchItem>, ProviderError> {
    if let Some(err) = resp.error {
        tracing::debug!(message = err.message.as_deref().unwrap_or(""), "google returned an error payload");
        return Err(ProviderError::call(Engine::Google, CallErrorKind::Payload));
    }
    Ok(resp
        .items
        .into_iter()
        .map(|i| SearchItem::from_parts(i.title, i.link, i.snippet.or(i.html_snippet), Engine::Google))
        .collect())
}

pub struct GoogleSearch {
    client: Client,
    endpoint: String,
    credentials: Option<(String, String)>,
    num: u32,
    timeout: Duration,
}

impl GoogleSearch {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            endpoint: settings.google_endpoint.clone(),
            credentials: settings.google_credentials().map(|(k, cx)| (k.to_string(), cx.to_string())),
            num: settings.results_per_provider.clamp(1, 10),
            timeout: settings.timeout(),
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn engine(&self) -> Engine { Engine::Google }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, ProviderError> {
        let (key, cx) = self.credentials.as_ref().ok_or(ProviderError::Unconfigured(Engine::Google))?;
        let num = self.num.to_string();
        let request = self.client.get(&self.endpoint).timeout(self.timeout).query(&[
            ("key", key.as_str()),
            ("cx", cx.as_str()),
            ("q", query),
            ("num", num.as_str()),
            ("safe", "active"),
        ]);
        let resp: GoogleResponse = get_json(Engine::Google, request).await?;
        parse(resp)
    }
}
