use afrisearch_core::rank::{dedupe, rank};
use afrisearch_core::{Engine, SearchItem};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_rank(c: &mut Criterion) {
    let engines = [Engine::Google, Engine::Bing, Engine::DuckDuckGo];
    let items: Vec<SearchItem> = (0..300)
        .map(|i| SearchItem::new(
            format!("Renewable energy project {i} in Morocco"),
            format!("https://example.com/{}", i % 200),
            "Solar and wind investment keeps growing across North Africa.",
            engines[i % 3],
        ))
        .collect();
    c.bench_function("dedupe_and_rank_300", |b| b.iter(|| rank(dedupe(items.clone()), "renewable energy Africa")));
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
