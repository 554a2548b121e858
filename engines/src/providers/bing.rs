//! Bing Web Search v7.

use afrisearch_core::{Engine, SearchItem};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{get_json, ProviderError, SearchProvider};
use crate::config::Settings;

#[derive(Debug, Deserialize)]
pub(crate) struct BingResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<BingItem>,
}

#[derive(Debug, Deserialize)]
struct BingItem {
    name: Option<String>,
    url: Option<String>,
    snippet: Option<String>,
}

pub(crate) fn parse(resp: BingResponse) -> Vec<SearchItem> {
    match resp.web_pages {
        Some(pages) => pages
            .value
            .into_iter()
            .map(|i| SearchItem::from_parts(i.name, i.url, i.snippet, Engine::Bing))
            .collect(),
        None => Vec::new(),
    }
}

pub struct BingSearch {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    count: u32,
    timeout: Duration,
}

impl BingSearch {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            endpoint: settings.bing_endpoint.clone(),
            api_key: settings.bing_api_key().map(str::to_string),
            count: settings.results_per_provider.max(1),
            timeout: settings.timeout(),
        }
    }
}

#[async_trait]
impl SearchProvider for BingSearch {
    fn engine(&self) -> Engine { Engine::Bing }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, ProviderError> {
        let key = self.api_key.as_ref().ok_or(ProviderError::Unconfigured(Engine::Bing))?;
        let count = self.count.to_string();
        let request = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .header("Ocp-Apim-Subscription-Key", key)
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("offset", "0"),
                ("mkt", "en-US"),
                ("safeSearch", "Moderate"),
            ]);
        let resp: BingResponse = get_json(Engine::Bing, request).await?;
        let items = parse(resp);
        if items.is_empty() {
            tracing::debug!(query, "bing returned no web pages");
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_web_pages() {
        let resp: BingResponse = serde_json::from_str(r#"{"webPages": {"value": [
            {"name": "Kigali innovation city", "url": "https://k", "snippet": "Rwanda builds"}
        ]}}"#).unwrap();
        assert_eq!(parse(resp), vec![SearchItem::new("Kigali innovation city", "https://k", "Rwanda builds", Engine::Bing)]);
    }

    #[test]
    fn no_web_pages_is_empty() {
        let resp: BingResponse = serde_json::from_str(r#"{"_type": "SearchResponse"}"#).unwrap();
        assert!(parse(resp).is_empty());
    }
}
