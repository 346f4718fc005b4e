//! Performance benchmarks for rating calculations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quiz_elo::engine::RatingEngine;
use quiz_elo::rating::{AdaptiveEloCalculator, RatingCalculator};
use quiz_elo::storage::{InMemoryStore, SessionRepository, StateKeys};
use quiz_elo::types::AnsweredItem;

fn bench_item(id: u64) -> AnsweredItem {
    AnsweredItem {
        item_id: id,
        text: format!("Benchmark question {}", id),
        category: ["Science", "History", "Geography", "Culture"][(id % 4) as usize].to_string(),
        difficulty: 600.0 + (id % 13) as f64 * 75.0,
        response_time: None,
    }
}

fn bench_compute_outcome(c: &mut Criterion) {
    let calculator = AdaptiveEloCalculator::default();

    c.bench_function("compute_outcome", |b| {
        b.iter(|| {
            calculator.compute_outcome(
                black_box(1200),
                black_box(1000.0),
                black_box(false),
                black_box(600),
            )
        })
    });
}

fn bench_record_answer(c: &mut Criterion) {
    let engine: RatingEngine = RatingEngine::default();
    let items: Vec<AnsweredItem> = (0..100).map(bench_item).collect();

    c.bench_function("record_100_answers", |b| {
        b.iter(|| {
            let mut session = engine.new_session();
            for (i, item) in items.iter().enumerate() {
                let _ = engine.record_answer(&mut session, black_box(item), i % 3 != 0);
            }
            session
        })
    });
}

fn bench_save_and_load(c: &mut Criterion) {
    let engine: RatingEngine = RatingEngine::default();
    let mut session = engine.new_session();
    for id in 0..500 {
        let _ = engine.record_answer(&mut session, &bench_item(id), id % 2 == 0);
    }

    let repository = SessionRepository::new(InMemoryStore::new(), StateKeys::default(), 800);

    c.bench_function("save_load_500_entries", |b| {
        b.iter(|| {
            repository.save(black_box(&session)).unwrap();
            repository.load()
        })
    });
}

criterion_group!(
    benches,
    bench_compute_outcome,
    bench_record_answer,
    bench_save_and_load
);
criterion_main!(benches);
