use criterion::{criterion_group, criterion_main, Criterion};
use engine::{BooleanMerger, IndexStore, Posting, RankedMerger};
use std::collections::HashMap;

const NUM_DOCS: u32 = 100_000;

// term "every{k}" holds every k-th document
fn synthetic_index() -> IndexStore {
    let mut map = HashMap::new();
    for k in [2u32, 3, 5, 7, 11] {
        let plist = (0..NUM_DOCS)
            .step_by(k as usize)
            .map(|d| Posting::new(format!("{d:08}"), d % 5 + 1))
            .collect();
        map.insert(format!("every{k}"), plist);
    }
    IndexStore::from_postings(map).expect("sorted synthetic postings")
}

fn bench_merges(c: &mut Criterion) {
    let index = synthetic_index();
    let terms = ["every2", "every3", "every5", "every7", "every11"];
    c.bench_function("boolean_5_terms", |b| {
        b.iter(|| BooleanMerger::new(&index, terms).run())
    });
    c.bench_function("ranked_5_terms", |b| {
        b.iter(|| RankedMerger::new(&index, terms, NUM_DOCS).and_then(RankedMerger::run))
    });
}

criterion_group!(benches, bench_merges);
criterion_main!(benches);
