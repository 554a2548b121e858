//! Turns a query into a response, stepping down from deep thinking to a
//! single search pass to a network-free answer.

use afrisearch_core::narrative::{local_narrative, template_narrative, RandomTheme, ThemeChooser};
use afrisearch_core::planner::{match_countries, MAX_RELEVANT_COUNTRIES};
use afrisearch_core::rank::{dedupe, rank};
use afrisearch_core::{Country, CountryWithLinks, Dataset, Engine, SearchItem};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::Aggregator;
use crate::error::PipelineError;
use crate::providers::ProviderRegistry;
use crate::thinking::{DeepThinker, ReasoningStep};

pub const MAX_SOURCES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePath {
    Deep,
    SinglePass,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub query: String,
    pub answer: String,
    pub related_countries: Vec<CountryWithLinks>,
    pub sources: Vec<SearchItem>,
    pub path: ResponsePath,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasoning_steps: Vec<ReasoningStep>,
}

/// Links served when nothing could be searched.
pub fn static_sources() -> Vec<SearchItem> {
    vec![
        SearchItem::new(
            "African Development Bank Group",
            "https://www.afdb.org",
            "Latest reports on African economic outlook and development opportunities",
            Engine::Unknown,
        ),
        SearchItem::new(
            "Africa Investment Forum",
            "https://www.africainvestmentforum.com",
            "Investment opportunities and partnerships across Africa",
            Engine::Unknown,
        ),
    ]
}

pub struct Orchestrator {
    aggregator: Aggregator,
    thinker: DeepThinker,
    dataset: Arc<Dataset>,
    themes: Arc<dyn ThemeChooser>,
    use_deep_thinking: bool,
}

impl Orchestrator {
    pub fn new(registry: Arc<dyn ProviderRegistry>, dataset: Arc<Dataset>) -> Self {
        let aggregator = Aggregator::new(registry);
        Self {
            thinker: DeepThinker::new(aggregator.clone(), dataset.clone()),
            aggregator,
            dataset,
            themes: Arc::new(RandomTheme),
            use_deep_thinking: true,
        }
    }

    pub fn with_theme_chooser(mut self, themes: Arc<dyn ThemeChooser>) -> Self {
        self.themes = themes;
        self
    }

    pub fn with_deep_thinking(mut self, enabled: bool) -> Self {
        self.use_deep_thinking = enabled;
        self
    }

    pub fn with_sub_query_timeout(mut self, timeout: Duration) -> Self {
        self.thinker = self.thinker.with_sub_query_timeout(timeout);
        self
    }

    pub fn uses_deep_thinking(&self) -> bool { self.use_deep_thinking }

    pub fn dataset(&self) -> &Dataset { &self.dataset }

    pub fn active_engines(&self) -> Vec<Engine> { self.aggregator.active_engines() }

    /// Always produces a response; the last path does no I/O.
    pub async fn generate_response(&self, query: &str) -> Response {
        if self.use_deep_thinking {
            match self.deep_response(query).await {
                Ok(response) => return response,
                Err(e) => tracing::warn!(query, error = %e, "deep thinking failed, falling back to single-pass search"),
            }
        }
        match self.single_pass_response(query).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(query, error = %e, "search failed, answering from local data");
                self.local_response(query)
            }
        }
    }

    pub async fn deep_response(&self, query: &str) -> Result<Response, PipelineError> {
        let thinking = self.thinker.think(query).await?;
        Ok(Response {
            query: query.to_string(),
            answer: thinking.narrative,
            related_countries: thinking.analysis.countries_with_links,
            sources: thinking.ranked.into_iter().take(MAX_SOURCES).map(|s| s.item).collect(),
            path: ResponsePath::Deep,
            reasoning_steps: thinking.reasoning_steps,
        })
    }

    /// One aggregation of the raw query, with countries scored from the query and the results.
    pub async fn single_pass_response(&self, query: &str) -> Result<Response, PipelineError> {
        let active = self.aggregator.snapshot();
        if active.is_empty() {
            return Err(PipelineError::NoActiveProviders);
        }
        let aggregated = self.aggregator.search_with(&active, query).await;
        let ranked: Vec<SearchItem> = rank(dedupe(aggregated.all_items), query).into_iter().map(|s| s.item).collect();
        let refs: Vec<&SearchItem> = ranked.iter().collect();

        let countries = related_countries_from_results(query, &refs, &self.dataset);
        let answer = template_narrative(query, &ranked, &countries, self.themes.as_ref());
        let related_countries = match_countries(&countries, &refs);
        tracing::info!(query, results = ranked.len(), countries = countries.len(), "single-pass response");

        Ok(Response {
            query: query.to_string(),
            answer,
            related_countries,
            sources: ranked.into_iter().take(MAX_SOURCES).collect(),
            path: ResponsePath::SinglePass,
            reasoning_steps: Vec::new(),
        })
    }

    pub fn local_response(&self, query: &str) -> Response {
        let countries = local_related_countries(query, &self.dataset);
        let answer = local_narrative(query, &countries, self.themes.as_ref());
        let sources = static_sources();
        let related_countries = countries
            .into_iter()
            .map(|country| CountryWithLinks { country, links: sources.clone() })
            .collect();
        Response {
            query: query.to_string(),
            answer,
            related_countries,
            sources,
            path: ResponsePath::Local,
            reasoning_steps: Vec::new(),
        }
    }
}

fn bump<'a>(scores: &mut Vec<(&'a Country, i64)>, country: &'a Country, start: i64, step: i64) {
    match scores.iter_mut().find(|(c, _)| c.name == country.name) {
        Some((_, score)) => *score += step,
        None => scores.push((country, start)),
    }
}

/// Scores countries by query name match (10), partial name words (3, then +2),
/// mentions in results (2, then +2) and keyword hits (3, then +3). First-seen order breaks ties.
pub fn related_countries_from_results(query: &str, items: &[&SearchItem], dataset: &Dataset) -> Vec<Country> {
    let lower = query.to_lowercase();
    let mut scores: Vec<(&Country, i64)> = Vec::new();

    for country in dataset.countries() {
        let name = country.name.to_lowercase();
        if lower.contains(&name) {
            scores.push((country, 10));
        }
        for word in name.split(' ') {
            if word.len() > 3 && lower.contains(word) {
                bump(&mut scores, country, 3, 2);
            }
        }
    }

    for item in items {
        let text = item.combined_lower();
        for country in dataset.countries() {
            if text.contains(&country.name.to_lowercase()) {
                bump(&mut scores, country, 2, 2);
            }
        }
    }

    for entry in dataset.keywords() {
        if !lower.contains(&entry.keyword) { continue; }
        for name in &entry.countries {
            if let Some(country) = dataset.country(name) {
                bump(&mut scores, country, 3, 3);
            }
        }
    }

    if scores.is_empty() {
        return dataset.top_general();
    }
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    scores.into_iter().take(MAX_RELEVANT_COUNTRIES).map(|(c, _)| c.clone()).collect()
}

/// Countries named in the query, then keyword-index countries, without any search results.
pub fn local_related_countries(query: &str, dataset: &Dataset) -> Vec<Country> {
    let lower = query.to_lowercase();
    let mut picked: Vec<&Country> = dataset
        .countries()
        .iter()
        .filter(|c| lower.contains(&c.name.to_lowercase()))
        .collect();
    for entry in dataset.keywords().iter().filter(|e| lower.contains(&e.keyword)) {
        for country in entry.countries.iter().filter_map(|n| dataset.country(n)) {
            if !picked.iter().any(|c| c.name == country.name) {
                picked.push(country);
            }
        }
    }
    if picked.is_empty() {
        return dataset.top_general();
    }
    picked.into_iter().take(MAX_RELEVANT_COUNTRIES).cloned().collect()
}
