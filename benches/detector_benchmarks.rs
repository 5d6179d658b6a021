use cosmos_rs::monitoring::{DetectorConfig, SlidingWindowAnomalyDetector};
use cosmos_rs::telemetry::{
    GeneratorConfig, RandomTelemetryGenerator, Reading, ReadingSource, TelemetryHistory,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sample_history(len: usize) -> Vec<Reading> {
    let mut generator = RandomTelemetryGenerator::seeded(GeneratorConfig::default(), 99);
    (0..len).map(|_| generator.next_reading()).collect()
}

fn benchmark_analyze(c: &mut Criterion) {
    let history = sample_history(100);
    let current = Reading::new(131.7);
    let mut group = c.benchmark_group("analyze");

    for window_size in [10usize, 50, 100] {
        let detector = SlidingWindowAnomalyDetector::new(DetectorConfig {
            window_size,
            ..DetectorConfig::default()
        });
        group.bench_with_input(
            BenchmarkId::from_parameter(window_size),
            &window_size,
            |b, _| b.iter(|| detector.analyze(black_box(&current), black_box(&history))),
        );
    }
    group.finish();
}

fn benchmark_history_push(c: &mut Criterion) {
    let readings = sample_history(1000);

    c.bench_function("history_push_with_eviction", |b| {
        b.iter(|| {
            let mut history = TelemetryHistory::with_capacity(100);
            for reading in &readings {
                history.push(black_box(reading.clone()));
            }
            history.len()
        })
    });
}

criterion_group!(benches, benchmark_analyze, benchmark_history_push);
criterion_main!(benches);
