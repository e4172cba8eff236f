//! Performance benchmarks for the pipeline controller
//!
//! Measures drain/cascade throughput for different lane layouts and the cost
//! of the recycle pool fallback.
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lanefeed::config::PipelineConfig;
use lanefeed::error::SourceError;
use lanefeed::models::Item;
use lanefeed::pipeline::PipelineController;

const DRAINS: usize = 1_000;

fn items(prefix: &str, n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item::new(format!("{prefix}{i}"), format!("mock://{prefix}/{i}")))
        .collect()
}

/// Controller with enough supply that no drain ever runs short
fn stocked_controller(lanes: usize) -> PipelineController {
    let config = PipelineConfig::default()
        .with_lane_count(lanes)
        .with_low_water(0);
    let supply = config.initial_total() + DRAINS;
    let mut controller = PipelineController::with_rng(config, fastrand::Rng::with_seed(1));
    let _ = controller.initialize(items("d", supply), Vec::new());
    controller
}

/// Benchmark draining every lane in turn
fn bench_drain_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_cascade");
    group.throughput(Throughput::Elements(DRAINS as u64));

    for lanes in [1, 3, 6].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_lanes", lanes)),
            lanes,
            |b, &lanes| {
                b.iter_batched(
                    || stocked_controller(lanes),
                    |mut controller| {
                        for i in 0..DRAINS {
                            let _ = controller.drain_lane(black_box(i % lanes));
                        }
                        controller
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

/// Benchmark a failed fetch served from a full recycle pool
fn bench_recycle_fallback(c: &mut Criterion) {
    let mut group = c.benchmark_group("recycle_fallback");

    for capacity in [100, 1_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("capacity_{}", capacity)),
            capacity,
            |b, &capacity| {
                b.iter_batched(
                    || {
                        let config = PipelineConfig::default()
                            .with_lane_count(1)
                            .with_visible_count(1)
                            .with_prefetch_margin(0)
                            .with_low_water(1)
                            .with_recycle_capacity(capacity);
                        let mut controller =
                            PipelineController::with_rng(config, fastrand::Rng::with_seed(1));
                        let mut ticket = controller.initialize(items("d", capacity + 1), Vec::new());
                        for _ in 0..capacity {
                            ticket = ticket.or(controller.drain_lane(0));
                        }
                        (controller, ticket)
                    },
                    |(mut controller, ticket)| {
                        if let Some(ticket) = ticket {
                            let outcome = controller.complete_replenish(
                                ticket,
                                Err(SourceError::RateLimited),
                            );
                            black_box(outcome);
                        }
                        controller
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_drain_cascade, bench_recycle_fallback);
criterion_main!(benches);
