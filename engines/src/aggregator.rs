use afrisearch_core::{Engine, SearchItem};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::providers::{ActiveProviders, CallErrorKind, ProviderError, ProviderRegistry};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregated {
    pub all_items: Vec<SearchItem>,
    pub by_engine: BTreeMap<Engine, Vec<SearchItem>>,
    pub total_results: usize,
}

impl Aggregated {
    /// Append another aggregation, concatenating per-engine buckets.
    pub fn extend(&mut self, other: Aggregated) {
        self.all_items.extend(other.all_items);
        for (engine, items) in other.by_engine {
            self.by_engine.entry(engine).or_default().extend(items);
        }
        self.total_results = self.all_items.len();
    }
}

/// Fans one query out to every active provider.
#[derive(Clone)]
pub struct Aggregator {
    registry: Arc<dyn ProviderRegistry>,
}

impl Aggregator {
    pub fn new(registry: Arc<dyn ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves configuration once; callers reuse the result for a whole request.
    pub fn snapshot(&self) -> ActiveProviders {
        self.registry.active()
    }

    pub fn active_engines(&self) -> Vec<Engine> {
        self.snapshot().engines()
    }

    /// Never fails: a provider that errors or times out contributes an empty bucket.
    pub async fn search_all(&self, query: &str) -> Aggregated {
        self.search_with(&self.snapshot(), query).await
    }

    pub async fn search_with(&self, active: &ActiveProviders, query: &str) -> Aggregated {
        if active.is_empty() {
            tracing::warn!("no search engines enabled, returning empty results");
            return Aggregated::default();
        }
        let timeout = active.timeout;

        let calls = active.providers.iter().map(|provider| {
            let provider = provider.clone();
            async move {
                let engine = provider.engine();
                let outcome = match tokio::time::timeout(timeout, provider.search(query)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::call(engine, CallErrorKind::Timeout)),
                };
                (engine, outcome)
            }
        });

        let mut aggregated = Aggregated::default();
        for (engine, outcome) in join_all(calls).await {
            let items = match outcome {
                Ok(items) => items,
                Err(ProviderError::Unconfigured(_)) => {
                    tracing::debug!(%engine, "provider not configured");
                    Vec::new()
                }
                Err(e) => {
                    tracing::warn!(%engine, error = %e, "search failed");
                    Vec::new()
                }
            };
            aggregated.all_items.extend(items.iter().cloned());
            aggregated.by_engine.insert(engine, items);
        }
        aggregated.total_results = aggregated.all_items.len();
        tracing::debug!(query, total = aggregated.total_results, engines = aggregated.by_engine.len(), "aggregated");
        aggregated
    }
}
