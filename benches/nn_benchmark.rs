use criterion::{black_box, criterion_group, criterion_main, Criterion};
use digit_net::{
    neural::data::{normalize_pixels, one_hot},
    NeuralNet, SyncStrategy, Trainer, TrainingRow,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn digit_net(seed: u64) -> NeuralNet {
    NeuralNet::with_rng(784, 100, 10, 0.3, &mut StdRng::seed_from_u64(seed)).unwrap()
}

fn random_rows(n: usize) -> Vec<TrainingRow> {
    let mut rng = StdRng::seed_from_u64(99);
    (0..n)
        .map(|_| TrainingRow::new(rng.gen_range(0..10), (0..784).map(|_| rng.gen()).collect()))
        .collect()
}

fn bench_query(c: &mut Criterion) {
    let net = digit_net(1);
    let input = normalize_pixels(&random_rows(1)[0].pixels);

    c.bench_function("query 784x100x10", |b| {
        b.iter(|| net.query(black_box(&input)).unwrap())
    });
}

fn bench_train_step(c: &mut Criterion) {
    let mut net = digit_net(2);
    let row = &random_rows(1)[0];
    let input = normalize_pixels(&row.pixels);
    let target = one_hot(row.label, 10).unwrap();

    c.bench_function("train step 784x100x10", |b| {
        b.iter(|| net.train(black_box(&input), black_box(&target)).unwrap())
    });
}

fn bench_parallel(c: &mut Criterion) {
    let rows = random_rows(256);

    let mut group = c.benchmark_group("train 256 rows");
    group.sample_size(10);
    for workers in [1, 4] {
        for strategy in [SyncStrategy::Locked, SyncStrategy::Averaged] {
            let trainer = Trainer::new().with_workers(workers).with_strategy(strategy);
            group.bench_function(format!("{strategy:?} {workers} workers"), |b| {
                b.iter(|| {
                    let mut net = digit_net(3);
                    trainer.train(&mut net, black_box(&rows)).unwrap()
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_query, bench_train_step, bench_parallel);
criterion_main!(benches);
