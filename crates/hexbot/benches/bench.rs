use core::{hint::black_box, time::Duration};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use hexbot::{
    ColorService, Deadline, GenerationConfig, GenerationPipeline, GeneratorOptions, SeededRandom,
    ThreadRandom, synthesize,
};
use tokio::runtime::Builder;

fn bench_synthesize(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize");
    group.throughput(Throughput::Elements(1));

    let configs = [
        ("random", GenerationConfig::default()),
        (
            "random_with_coordinates",
            GenerationConfig::builder().dimensions(1920, 1080).build(),
        ),
        (
            "seeded",
            GenerationConfig::builder()
                .seeds(["abc123", "1e90ff", "ff7f50"])
                .build(),
        ),
        (
            "achromatic_seed",
            GenerationConfig::builder().seeds(["808080"]).build(),
        ),
    ];

    for (name, config) in &configs {
        let mut rng = SeededRandom::new(42);
        group.bench_function(*name, |b| {
            b.iter(|| black_box(synthesize(black_box(config), &mut rng)));
        });
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for count in [100, 10_000] {
        let config = GenerationConfig::builder()
            .count(count)
            .seeds(["abc123"])
            .build();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("fill/{count}"), |b| {
            b.iter(|| {
                let mut colors = Vec::new();
                let mut pipeline =
                    GenerationPipeline::new(count, &config, Deadline::never(), ThreadRandom);
                let _ = pipeline.fill(&mut colors);
                black_box(colors)
            });
        });
    }
    group.finish();
}

fn bench_service(c: &mut Criterion) {
    let rt = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");
    let service = ColorService::new(GeneratorOptions {
        worker_timeout: Duration::from_secs(30),
        request_timeout: Duration::from_secs(30),
        ..GeneratorOptions::default()
    })
    .expect("valid options");

    let mut group = c.benchmark_group("service");
    for count in [499, 500, 100_000] {
        let config = GenerationConfig::builder()
            .count(count)
            .dimensions(64, 64)
            .build();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("generate/{count}"), |b| {
            b.iter(|| rt.block_on(service.generate(black_box(&config))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_synthesize, bench_pipeline, bench_service);
criterion_main!(benches);
