//! Criterion benchmarks for the occupancy step.
//!
//! Benchmarks:
//!   - step:           one tick on synthetic networks of increasing size
//!   - step_parallel:  the same large network, sequential vs rayon path
//!
//! Run with: cargo bench --bench step_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use metro_occupancy::core::config::SimulationConfig;
use metro_occupancy::network::synthetic::{generate, SyntheticConfig};
use metro_occupancy::network::NetworkBuilder;
use metro_occupancy::simulation::SimulationEngine;

fn engine(lines: usize, stations_per_line: usize, config: &SimulationConfig) -> SimulationEngine {
    let (topology, baseline) = generate(&SyntheticConfig {
        lines,
        stations_per_line,
        ..SyntheticConfig::default()
    });
    let graph = NetworkBuilder::new(config)
        .from_ordered_lines(&topology)
        .expect("synthetic network builds");
    SimulationEngine::new(graph, &baseline, config).expect("default config is valid")
}

// ---------------------------------------------------------------------------
// Benchmark: single tick by network size
// ---------------------------------------------------------------------------

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    let config = SimulationConfig::default();

    for (lines, per_line) in [(12, 16), (32, 32), (64, 64)] {
        let mut engine = engine(lines, per_line, &config);
        group.bench_with_input(
            BenchmarkId::from_parameter(engine.graph().len()),
            &(),
            |b, _| {
                b.iter(|| {
                    engine.step();
                    black_box(engine.total_occupancy())
                });
            },
        );
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: sequential vs parallel on a large network
// ---------------------------------------------------------------------------

fn bench_step_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_parallel");
    group.sample_size(50);

    let sequential = SimulationConfig {
        parallel_threshold: usize::MAX,
        ..SimulationConfig::default()
    };
    let parallel = SimulationConfig {
        parallel_threshold: 0,
        ..SimulationConfig::default()
    };

    for (label, config) in [("sequential", sequential), ("parallel", parallel)] {
        let mut engine = engine(64, 64, &config);
        group.bench_function(label, |b| {
            b.iter(|| {
                engine.step();
                black_box(engine.tick())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_step_parallel);
criterion_main!(benches);
