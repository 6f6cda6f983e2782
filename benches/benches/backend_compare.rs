//! Backend Comparison Benchmark
//!
//! Compares the runtime dispatcher against explicitly selected AES-NI and
//! portable backends, and isolates the GHASH kernel from the full pass.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use ferrule_gcm::{backend_table, AesGcm, BackendKind};
use std::hint::black_box;

const KEY: [u8; 16] = [0x42; 16];
const NONCE: [u8; 12] = [0x24; 12];

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("ferrule Backends");

    // Scenarios:
    // - Small (7B): Tail path only, setup dominates
    // - Medium (1KB): L1 cache hot-path
    // - Large (256KB): Bulk throughput (4-block batches)
    let sizes = [7, 1024, 256 * 1024];

    let backends = [
        ("Auto (Default)", BackendKind::Auto),
        ("AES-NI Native", BackendKind::AesNi),
        ("Portable (No SIMD)", BackendKind::Portable),
    ];

    for size in sizes {
        let mut buffer = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        for (label, kind) in backends {
            // Skip backends this CPU cannot run
            let Ok(gcm) = AesGcm::with_backend(&KEY, kind) else {
                continue;
            };
            group.bench_function(format!("{label} - {size} bytes"), |b| {
                b.iter(|| gcm.encrypt_in_place(&NONCE, &[], black_box(&mut buffer)).unwrap());
            });
        }
    }
    group.finish();
}

fn bench_ghash(c: &mut Criterion) {
    let mut group = c.benchmark_group("ferrule GHASH");
    let size = 64 * 1024;
    let data = vec![0x5Au8; size];
    let h_powers = [[0x11u8; 16], [0x22; 16], [0x33; 16], [0x44; 16]];
    group.throughput(Throughput::Bytes(size as u64));

    for kind in [BackendKind::AesNi, BackendKind::Portable] {
        let Ok(backend) = backend_table(kind) else {
            continue;
        };
        group.bench_function(format!("{} - {size} bytes", backend.name), |b| {
            b.iter(|| {
                let mut acc = [0u8; 16];
                (backend.ghash)(&h_powers, black_box(&data), &mut acc);
                acc
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_backends, bench_ghash);
criterion_main!(benches);
