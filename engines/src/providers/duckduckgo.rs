//! DuckDuckGo Instant Answer API. Keyless, and only returns abstracts and related topics.

use afrisearch_core::tokenizer::truncate_chars;
use afrisearch_core::{Engine, SearchItem};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::form_urlencoded;

use super::{get_json, ProviderError, SearchProvider};
use crate::config::Settings;

const MAX_ITEMS: usize = 10;
const MAX_TOPICS: usize = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
}

pub fn results_page(query: &str) -> String {
    let q: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("https://duckduckgo.com/?q={q}")
}

pub(crate) fn parse(answer: InstantAnswer, query: &str) -> Vec<SearchItem> {
    let mut items = Vec::new();
    if !answer.abstract_text.is_empty() {
        let title = if answer.heading.is_empty() { query.to_string() } else { answer.heading };
        let url = if answer.abstract_url.is_empty() { results_page(query) } else { answer.abstract_url };
        items.push(SearchItem::new(title, url, answer.abstract_text, Engine::DuckDuckGo));
    }
    // grouped topics carry no Text/FirstURL at the top level and are skipped
    for topic in answer.related_topics.into_iter().take(MAX_TOPICS) {
        if let (Some(text), Some(url)) = (topic.text, topic.first_url) {
            if text.is_empty() || url.is_empty() { continue; }
            items.push(SearchItem::new(truncate_chars(&text, 100), url, text, Engine::DuckDuckGo));
        }
    }
    if items.is_empty() {
        items.push(SearchItem::new(
            format!("Search results for \"{query}\""),
            results_page(query),
            format!("Click to view search results for \"{query}\" on DuckDuckGo"),
            Engine::DuckDuckGo,
        ));
    }
    items.truncate(MAX_ITEMS);
    items
}

pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl DuckDuckGoSearch {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self { client, endpoint: settings.duckduckgo_endpoint.clone(), timeout: settings.timeout() }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn engine(&self) -> Engine { Engine::DuckDuckGo }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, ProviderError> {
        let request = self.client.get(&self.endpoint).timeout(self.timeout).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]);
        let answer: InstantAnswer = get_json(Engine::DuckDuckGo, request).await?;
        Ok(parse(answer, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abstract_and_topics() {
        let answer: InstantAnswer = serde_json::from_str(r#"{
            "Heading": "Kenya",
            "AbstractText": "Kenya is a country in East Africa.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Kenya",
            "RelatedTopics": [
                {"Text": "Nairobi - capital of Kenya", "FirstURL": "https://duckduckgo.com/Nairobi"},
                {"Name": "Grouped", "Topics": []}
            ]
        }"#).unwrap();
        let items = parse(answer, "kenya");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Kenya");
        assert_eq!(items[1].url, "https://duckduckgo.com/Nairobi");
    }

    #[test]
    fn empty_answer_links_to_results_page() {
        let items = parse(InstantAnswer::default(), "solar power Africa");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "https://duckduckgo.com/?q=solar+power+Africa");
    }
}
