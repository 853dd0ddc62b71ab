use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trm_rules::RuleClassifier;

/// Generate descriptions that hit each domain and miss all of them
fn generate_descriptions(count: usize) -> Vec<String> {
    let samples = [
        "Relational database engine",
        "Deep learning training toolkit",
        "Endpoint antivirus suite",
        "Reverse proxy for web traffic",
        "Source code compiler",
        "A simple calculator",
    ];

    (0..count)
        .map(|i| format!("{} edition {}", samples[i % samples.len()], i))
        .collect()
}

/// Benchmark single-record classification
fn benchmark_single_classification(c: &mut Criterion) {
    let classifier = RuleClassifier::standard();
    let mut group = c.benchmark_group("single_classification");

    group.bench_function("first_domain_hit", |b| {
        b.iter(|| black_box(classifier.classify_text(black_box("Relational database engine"), "")));
    });

    group.bench_function("no_hit", |b| {
        b.iter(|| black_box(classifier.classify_text(black_box("A simple calculator"), "")));
    });

    group.finish();
}

/// Benchmark batch classification over growing inventories
fn benchmark_batch_classification(c: &mut Criterion) {
    let classifier = RuleClassifier::standard();
    let mut group = c.benchmark_group("batch_classification");

    for size in [100, 1000, 10000].iter() {
        let descriptions = generate_descriptions(*size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_records", size)),
            &descriptions,
            |b, descriptions| {
                b.iter(|| {
                    for description in descriptions {
                        black_box(classifier.classify_text(description, ""));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_classification, benchmark_batch_classification);
criterion_main!(benches);
