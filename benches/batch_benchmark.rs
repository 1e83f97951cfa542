use batchgate::BatchExecutor;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

fn batch_throughput(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("batch_run");

    for &concurrency in &[1usize, 4, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(concurrency),
            &concurrency,
            |b, &limit| {
                b.to_async(&rt).iter(|| async move {
                    let executor = BatchExecutor::new().with_concurrency(limit);
                    let cancel = CancellationToken::new();
                    executor
                        .run(
                            &cancel,
                            (0u32..256).collect(),
                            |_c: CancellationToken, n: u32| async move {
                                Ok::<_, String>(black_box(n).wrapping_mul(3))
                            },
                        )
                        .await
                });
            },
        );
    }

    group.finish();
}

fn stop_on_error_overhead(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    c.bench_function("batch_run_stop_on_error", |b| {
        b.to_async(&rt).iter(|| async {
            let executor = BatchExecutor::new()
                .with_concurrency(8)
                .with_stop_on_error(true);
            let cancel = CancellationToken::new();
            executor
                .run(
                    &cancel,
                    (0u32..256).collect(),
                    |_c: CancellationToken, n: u32| async move {
                        Ok::<_, String>(black_box(n) + 1)
                    },
                )
                .await
        });
    });
}

criterion_group!(benches, batch_throughput, stop_on_error_overhead);
criterion_main!(benches);
