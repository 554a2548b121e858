//! The six-stage "deep thinking" run: plan, search a few derived queries, analyze, narrate.

use afrisearch_core::narrative::deep_narrative;
use afrisearch_core::planner::{self, AfricaRelevance, Analysis, QueryUnderstanding};
use afrisearch_core::rank::{dedupe, rank};
use afrisearch_core::{Dataset, Engine, ScoredItem, SearchItem};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{Aggregated, Aggregator};
use crate::error::PipelineError;

/// Only the first few sub-queries are searched.
pub const MAX_SUB_QUERY_SEARCHES: usize = 3;
pub const MAX_RANKED: usize = 20;
const SUB_QUERY_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasoningStep {
    pub step: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Thinking {
    pub query: String,
    pub understanding: QueryUnderstanding,
    pub relevance: AfricaRelevance,
    pub sub_queries: Vec<String>,
    pub searched: usize,
    pub ranked: Vec<ScoredItem>,
    pub by_engine: BTreeMap<Engine, Vec<SearchItem>>,
    pub analysis: Analysis,
    pub narrative: String,
    pub reasoning_steps: Vec<ReasoningStep>,
}

#[derive(Default)]
struct Trace(Vec<ReasoningStep>);

impl Trace {
    fn record(&mut self, kind: &str, data: Value) {
        let step = self.0.len() as u32 + 1;
        tracing::debug!(step, kind, "reasoning step");
        self.0.push(ReasoningStep { step, kind: kind.to_string(), data });
    }
}

struct MultiSearch {
    ranked: Vec<ScoredItem>,
    by_engine: BTreeMap<Engine, Vec<SearchItem>>,
    total_results: usize,
    searched: usize,
}

pub struct DeepThinker {
    aggregator: Aggregator,
    dataset: Arc<Dataset>,
    sub_query_timeout: Option<Duration>,
}

impl DeepThinker {
    pub fn new(aggregator: Aggregator, dataset: Arc<Dataset>) -> Self {
        Self { aggregator, dataset, sub_query_timeout: None }
    }

    /// Bound on one sub-query search. Defaults to the provider call timeout plus one second.
    pub fn with_sub_query_timeout(mut self, timeout: Duration) -> Self {
        self.sub_query_timeout = Some(timeout);
        self
    }

    pub async fn think(&self, query: &str) -> Result<Thinking, PipelineError> {
        let mut trace = Trace::default();

        let understanding = planner::understand(query, &self.dataset);
        trace.record("understanding", json!({
            "query_type": understanding.query_type,
            "entities": understanding.entities,
            "keywords": understanding.keywords,
            "is_question": understanding.is_question,
            "is_comparison": understanding.is_comparison,
        }));

        let relevance = planner::africa_relevance(query, &understanding, &self.dataset);
        let country_names: Vec<&str> = relevance.relevant_countries.iter().map(|c| c.name.as_str()).collect();
        trace.record("africa_relevance", json!({
            "countries": country_names,
            "sectors": relevance.relevant_sectors,
            "explicit_africa": relevance.has_explicit_africa_mention,
            "score": relevance.relevance_score,
        }));

        // Never empty: the first entry is always the query itself.
        let sub_queries = planner::sub_queries(query, &understanding, &relevance, &self.dataset);
        trace.record("sub_queries", json!({ "queries": sub_queries }));

        let search = self.multi_search(&sub_queries).await?;
        trace.record("search", json!({
            "searched": search.searched,
            "total_results": search.total_results,
            "unique_ranked": search.ranked.len(),
            "engines": search.by_engine.iter().map(|(e, items)| (e.as_str(), items.len())).collect::<BTreeMap<_, _>>(),
        }));

        let analysis = planner::analyze(&search.ranked, &relevance);
        trace.record("analysis", json!({
            "insights": analysis.insights.len(),
            "countries_with_links": analysis.countries_with_links.len(),
            "trends": analysis.trends,
        }));

        let narrative = deep_narrative(query, &analysis, &relevance);
        trace.record("narrative", json!({ "chars": narrative.chars().count() }));

        tracing::info!(query, searched = search.searched, ranked = search.ranked.len(), "deep thinking complete");
        Ok(Thinking {
            query: query.to_string(),
            understanding,
            relevance,
            sub_queries,
            searched: search.searched,
            ranked: search.ranked,
            by_engine: search.by_engine,
            analysis,
            narrative,
            reasoning_steps: trace.0,
        })
    }

    /// Stage 4. Searches the leading sub-queries concurrently and ranks the merged union
    /// against the first one.
    async fn multi_search(&self, sub_queries: &[String]) -> Result<MultiSearch, PipelineError> {
        let active = self.aggregator.snapshot();
        if active.is_empty() {
            return Err(PipelineError::NoActiveProviders);
        }
        let limit = self.sub_query_timeout.unwrap_or(active.timeout + SUB_QUERY_GRACE);

        let active = &active;
        let searches = sub_queries.iter().take(MAX_SUB_QUERY_SEARCHES).map(|q| async move {
            (q.as_str(), tokio::time::timeout(limit, self.aggregator.search_with(active, q)).await)
        });

        let mut merged = Aggregated::default();
        let mut searched = 0;
        for (sub_query, outcome) in join_all(searches).await {
            match outcome {
                Ok(aggregated) => {
                    searched += 1;
                    merged.extend(aggregated);
                }
                Err(_) => tracing::warn!(sub_query, "sub-query search timed out, skipping"),
            }
        }
        if searched == 0 {
            return Err(PipelineError::AllSubQueriesFailed);
        }

        let Aggregated { all_items, by_engine, total_results } = merged;
        let mut ranked = rank(dedupe(all_items), &sub_queries[0]);
        ranked.truncate(MAX_RANKED);
        Ok(MultiSearch { ranked, by_engine, total_results, searched })
    }
}
