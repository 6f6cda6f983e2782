//! Queue Benchmark
//!
//! Hand-off cost through the bounded queue: single-threaded push/pop pairs
//! and a producer thread streaming to a consumer.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferrule_queue::{bytes, value, Timeout};
use std::hint::black_box;
use std::thread;

const ITEMS: u64 = 10_000;

// =============================================================================
// BENCHMARK 1: UNCONTENDED
// =============================================================================

/// One push and one pop on the same thread: the fixed cost of the protocol.
fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("1-Roundtrip");

    for size in [8usize, 256, 4096] {
        let (mut tx, mut rx) = bytes::bounded(16, size).unwrap();
        let payload = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("bytes", size), |b| {
            b.iter(|| {
                assert!(tx.push(black_box(&payload)));
                let item = rx.pop_begin(Timeout::Poll).unwrap();
                black_box(item.len())
            })
        });
    }

    let (tx, mut rx) = value::bounded::<Box<[u8; 64]>>(16).unwrap();
    group.throughput(Throughput::Elements(1));
    group.bench_function("value (boxed)", |b| {
        b.iter(|| {
            tx.push(Box::new([0u8; 64])).unwrap();
            black_box(rx.pop(Timeout::Poll).unwrap())
        })
    });
    group.finish();
}

// =============================================================================
// BENCHMARK 2: SPSC STREAM
// =============================================================================

/// Producer thread streaming `ITEMS` values to a blocking consumer.
fn bench_spsc(c: &mut Criterion) {
    let mut group = c.benchmark_group("2-SPSC");
    group.sample_size(20);
    group.throughput(Throughput::Elements(ITEMS));

    for capacity in [4u32, 64, 1024] {
        group.bench_function(BenchmarkId::from_parameter(capacity), |b| {
            b.iter(|| {
                let (tx, mut rx) = value::bounded::<u64>(capacity).unwrap();
                let producer = thread::spawn(move || {
                    for i in 0..ITEMS {
                        while tx.push(i).is_err() {
                            std::hint::spin_loop();
                        }
                    }
                });
                let mut sum = 0u64;
                for _ in 0..ITEMS {
                    sum += rx.pop(Timeout::Forever).unwrap();
                }
                producer.join().unwrap();
                black_box(sum)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_roundtrip, bench_spsc);
criterion_main!(benches);
