//! Query planning ("deep thinking") stages that need no network access.
//!
//! Stage 4, the multi-query search itself, lives in the engines crate and
//! feeds its ranked items back into [`analyze`].

use serde::Serialize;

use crate::dataset::{Country, Dataset};
use crate::item::{CountryWithLinks, ScoredItem, SearchItem};
use crate::tokenizer::{query_words, sentences, trend_words};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Business,
    Technology,
    Agriculture,
    Energy,
    Infrastructure,
    General,
}

/// Keyword families in match priority order; the first family with a hit wins.
const QUERY_FAMILIES: &[(QueryType, &[&str])] = &[
    (QueryType::Business, &["business", "investment", "opportunity", "market", "economy", "sector", "industry"]),
    (QueryType::Technology, &["technology", "tech", "innovation", "digital", "startup", "fintech"]),
    (QueryType::Agriculture, &["agriculture", "farming", "crop", "food", "agricultural"]),
    (QueryType::Energy, &["energy", "power", "renewable", "solar", "oil", "gas", "electricity"]),
    (QueryType::Infrastructure, &["infrastructure", "construction", "development", "building", "road", "transport"]),
];

impl QueryType {
    pub fn classify(query: &str) -> Self {
        let lower = query.to_lowercase();
        QUERY_FAMILIES
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(t, _)| *t)
            .unwrap_or(QueryType::General)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryUnderstanding {
    pub original_query: String,
    pub query_type: QueryType,
    pub entities: Vec<Entity>,
    pub keywords: Vec<String>,
    pub is_question: bool,
    pub is_comparison: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AfricaRelevance {
    pub relevant_countries: Vec<Country>,
    pub relevant_sectors: Vec<String>,
    pub has_explicit_africa_mention: bool,
    pub relevance_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub total_results: usize,
    pub insights: Vec<String>,
    pub countries_with_links: Vec<CountryWithLinks>,
    pub trends: Vec<String>,
    pub top_sources: Vec<SearchItem>,
}

pub const MAX_RELEVANT_COUNTRIES: usize = 5;
pub const MAX_LINKS_PER_COUNTRY: usize = 3;

/// Stage 1: classify intent and pull out country entities.
pub fn understand(query: &str, dataset: &Dataset) -> QueryUnderstanding {
    let lower = query.to_lowercase();
    let entities = dataset
        .countries()
        .iter()
        .filter(|c| lower.contains(&c.name.to_lowercase()))
        .map(|c| Entity { kind: "country".to_string(), value: c.name.clone() })
        .collect();
    QueryUnderstanding {
        original_query: query.to_string(),
        query_type: QueryType::classify(query),
        entities,
        keywords: query_words(query),
        is_question: query.trim().ends_with('?'),
        is_comparison: lower.contains(" vs ") || lower.contains(" versus ") || lower.contains(" compare"),
    }
}

/// Stage 2: countries named in the query, then countries behind any matching keyword.
pub fn africa_relevance(query: &str, understanding: &QueryUnderstanding, dataset: &Dataset) -> AfricaRelevance {
    let lower = query.to_lowercase();
    let mut countries: Vec<Country> = dataset
        .countries()
        .iter()
        .filter(|c| lower.contains(&c.name.to_lowercase()))
        .cloned()
        .collect();
    let mut sectors = Vec::new();
    for entry in dataset.keywords() {
        if !lower.contains(&entry.keyword) { continue; }
        sectors.push(entry.keyword.clone());
        for name in &entry.countries {
            if countries.iter().any(|c| &c.name == name) { continue; }
            if let Some(c) = dataset.country(name) {
                countries.push(c.clone());
            }
        }
    }
    if countries.is_empty() {
        countries = dataset.top_for(understanding.query_type);
    }
    let relevance_score = if countries.is_empty() { 50 } else { 100 };
    countries.truncate(MAX_RELEVANT_COUNTRIES);
    AfricaRelevance {
        relevant_countries: countries,
        relevant_sectors: sectors,
        has_explicit_africa_mention: mentions_africa(&lower),
        relevance_score,
    }
}

fn mentions_africa(lower: &str) -> bool {
    lower.contains("africa") || lower.contains("african")
}

/// Append " Africa" unless the query already carries African context.
pub fn ensure_africa_context(query: &str) -> String {
    if mentions_africa(&query.to_lowercase()) {
        query.to_string()
    } else {
        format!("{query} Africa")
    }
}

/// Stage 3: a small, ordered, duplicate-free list of derived queries.
pub fn sub_queries(query: &str, understanding: &QueryUnderstanding, relevance: &AfricaRelevance, dataset: &Dataset) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut out = vec![ensure_africa_context(query)];

    if !relevance.relevant_countries.is_empty() {
        for c in relevance.relevant_countries.iter().take(3) {
            out.push(ensure_africa_context(&format!("{query} {}", c.name)));
        }
    } else {
        for c in dataset.top_for(understanding.query_type).iter().take(2) {
            out.push(ensure_africa_context(&format!("{query} {}", c.name)));
        }
    }

    for sector in relevance.relevant_sectors.iter().take(2) {
        out.push(format!("{query} {sector} Africa"));
    }

    if understanding.query_type != QueryType::Business && !lower.contains("business") && !lower.contains("investment") {
        out.push(format!("{query} business opportunities Africa"));
    }
    if !lower.contains("african countries") {
        out.push(format!("{query} African countries"));
    }

    let mut unique: Vec<String> = Vec::with_capacity(out.len());
    for q in out {
        if !unique.contains(&q) { unique.push(q); }
    }
    unique
}

/// Stage 5: insights, per-country supporting links and trend words from ranked items.
pub fn analyze(ranked: &[ScoredItem], relevance: &AfricaRelevance) -> Analysis {
    let items: Vec<&SearchItem> = ranked.iter().map(|s| &s.item).collect();
    let insights = extract_insights(&items);
    let texts: Vec<String> = items.iter().take(10).map(|i| i.combined_lower()).collect();
    let trends = trend_words(texts.iter().map(String::as_str), 5);
    Analysis {
        total_results: items.len(),
        insights,
        countries_with_links: match_countries(&relevance.relevant_countries, &items),
        trends,
        top_sources: items.iter().take(10).map(|i| (*i).clone()).collect(),
    }
}

fn extract_insights(items: &[&SearchItem]) -> Vec<String> {
    let joined = items.iter().take(10).map(|i| i.description.as_str()).collect::<Vec<_>>().join(" ");
    sentences(&joined).into_iter().take(5).collect()
}

/// Attach up to three items mentioning each country by name.
pub fn match_countries(countries: &[Country], items: &[&SearchItem]) -> Vec<CountryWithLinks> {
    countries
        .iter()
        .map(|country| {
            let needle = country.name.to_lowercase();
            let links = items
                .iter()
                .filter(|i| i.combined_lower().contains(&needle))
                .take(MAX_LINKS_PER_COUNTRY)
                .map(|i| (*i).clone())
                .collect();
            CountryWithLinks { country: country.clone(), links }
        })
        .collect()
}
