use std::collections::HashSet;

use crate::item::{ScoredItem, SearchItem};
use crate::tokenizer::query_words;

/// Keep the first item per url, preserving order. Items with an empty url are dropped.
pub fn dedupe(items: Vec<SearchItem>) -> Vec<SearchItem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if item.url.is_empty() || seen.contains(&item.url) { continue; }
        seen.insert(item.url.clone());
        unique.push(item);
    }
    unique
}

/// Additive keyword-overlap score of one item against a query.
pub fn score(item: &SearchItem, query: &str) -> i64 {
    let query_lower = query.to_lowercase();
    let title = item.title.to_lowercase();
    let desc = item.description.to_lowercase();
    let mut score = 0;
    for word in query_words(query) {
        if title.contains(&word) { score += 10; }
        if desc.contains(&word) { score += 5; }
    }
    if format!("{title} {desc}").contains(&query_lower) { score += 20; }
    score + item.engine.preference_bonus()
}

/// Score and sort descending; equal scores keep input order.
pub fn rank(items: Vec<SearchItem>, query: &str) -> Vec<ScoredItem> {
    let mut scored: Vec<ScoredItem> = items
        .into_iter()
        .map(|item| {
            let score = score(&item, query);
            ScoredItem { item, score }
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}
