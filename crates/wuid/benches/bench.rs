use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};
use wuid::{Lease, Logger, Options, Wuid};

struct SilentLogger;

impl Logger for SilentLogger {
    fn info(&self, _: &str) {}

    fn warn(&self, _: &str) {}
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

fn loaded_generator(options: Options) -> Wuid {
    let generator = Wuid::new("bench", SilentLogger, options).unwrap();
    generator
        .load_epoch(|| Ok::<_, std::io::Error>(Lease::new(1)))
        .unwrap();
    generator
}

/// Benchmarks the single-threaded hot path.
fn bench_generator(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> Wuid) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_fn();
                for _ in 0..TOTAL_IDS {
                    black_box(generator.next_id());
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks one generator shared across threads.
fn bench_generator_contended(c: &mut Criterion, group_name: &str, generator_fn: impl Fn() -> Wuid) {
    let mut group = c.benchmark_group(group_name);
    let max_threads = num_cpus::get().max(1);

    for thread_count in [1, 2, 4, 8, 16].into_iter().filter(|&n| n <= max_threads) {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(
            format!("elems/{}/threads/{}", TOTAL_IDS, thread_count),
            |b| {
                b.iter_custom(|iters| {
                    let start = Instant::now();

                    for _ in 0..iters {
                        let generator = generator_fn();
                        let barrier = Arc::new(Barrier::new(thread_count + 1));
                        scope(|s| {
                            for _ in 0..thread_count {
                                let generator = generator.clone();
                                let barrier = Arc::clone(&barrier);
                                s.spawn(move || {
                                    barrier.wait();
                                    for _ in 0..ids_per_thread {
                                        black_box(generator.next_id());
                                    }
                                });
                            }
                            barrier.wait();
                        });
                    }

                    start.elapsed()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_sequential(c: &mut Criterion) {
    bench_generator(c, "sequential/plain", || loaded_generator(Options::new()));
}

fn benchmark_sequential_sectioned(c: &mut Criterion) {
    bench_generator(c, "sequential/sectioned", || {
        loaded_generator(Options::new().with_section(1))
    });
}

fn benchmark_contended(c: &mut Criterion) {
    bench_generator_contended(c, "contended/plain", || loaded_generator(Options::new()));
}

criterion_group!(
    benches,
    benchmark_sequential,
    benchmark_sequential_sectioned,
    benchmark_contended,
);
criterion_main!(benches);
