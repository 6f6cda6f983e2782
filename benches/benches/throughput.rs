//! ferrule Comprehensive Criterion Benchmark
//!
//! AES-128-GCM latency and bulk throughput, sealing and opening, with ring's
//! AES-128-GCM as a reference point.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferrule_gcm::AesGcm;
use rand::prelude::*;
use ring::aead;
use std::hint::black_box;

const KB: usize = 1024;
const MB: usize = 1024 * 1024;

const KEY: [u8; 16] = [0x42; 16];
const NONCE: [u8; 12] = [0x24; 12];

fn random_input(size: usize) -> Vec<u8> {
    let mut input = vec![0u8; size];
    rand::rng().fill(&mut input[..]);
    input
}

// =============================================================================
// BENCHMARK 1: LATENCY
// =============================================================================

/// Small records (packets, messages): fixed per-call cost dominates.
fn bench_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("1-Latency");
    let gcm = AesGcm::new(&KEY).unwrap();

    let sizes = [(16, "16B"), (64, "64B"), (256, "256B"), (KB, "1KB"), (4 * KB, "4KB")];

    for (size, name) in sizes {
        let mut buffer = random_input(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| gcm.encrypt_in_place(&NONCE, &[], black_box(&mut buffer)).unwrap())
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 2: BULK
// =============================================================================

/// Large buffers: steady-state batched throughput.
fn bench_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("2-Bulk");
    group.sample_size(30);
    let gcm = AesGcm::new(&KEY).unwrap();

    let sizes = [(64 * KB, "64KB"), (MB, "1MB"), (16 * MB, "16MB")];

    for (size, name) in sizes {
        let mut buffer = random_input(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter(|| gcm.encrypt_in_place(&NONCE, &[], black_box(&mut buffer)).unwrap())
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 3: OPEN
// =============================================================================

/// Verify-then-decrypt: GHASH runs as a separate pass before CTR.
fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("3-Open");
    let gcm = AesGcm::new(&KEY).unwrap();

    for (size, name) in [(KB, "1KB"), (64 * KB, "64KB"), (MB, "1MB")] {
        let plaintext = random_input(size);
        let mut sealed = plaintext.clone();
        let tag = gcm.encrypt_in_place(&NONCE, b"hdr", &mut sealed).unwrap();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("in-place", name), |b| {
            b.iter_batched_ref(
                || sealed.clone(),
                |buf| gcm.decrypt_in_place(&NONCE, b"hdr", black_box(buf), &tag).unwrap(),
                criterion::BatchSize::LargeInput,
            )
        });

        let mut out = vec![0u8; size];
        let mut detached_tag = [0u8; 16];
        gcm.encrypt(&plaintext, &NONCE, &mut detached_tag, &mut sealed).unwrap();
        group.bench_function(BenchmarkId::new("detached", name), |b| {
            b.iter(|| {
                gcm.decrypt(black_box(&sealed), &NONCE, &detached_tag, &mut out)
                    .unwrap()
            })
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 4: REFERENCE
// =============================================================================

/// Same workload through ring's AES-128-GCM.
fn bench_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("4-Reference");
    let gcm = AesGcm::new(&KEY).unwrap();
    let ring_key = aead::LessSafeKey::new(aead::UnboundKey::new(&aead::AES_128_GCM, &KEY).unwrap());

    for (size, name) in [(KB, "1KB"), (64 * KB, "64KB"), (MB, "1MB")] {
        let mut buffer = random_input(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("ferrule", name), |b| {
            b.iter(|| gcm.encrypt_in_place(&NONCE, &[], black_box(&mut buffer)).unwrap())
        });
        group.bench_function(BenchmarkId::new("ring", name), |b| {
            b.iter(|| {
                ring_key
                    .seal_in_place_separate_tag(
                        aead::Nonce::assume_unique_for_key(NONCE),
                        aead::Aad::empty(),
                        black_box(&mut buffer),
                    )
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_latency, bench_bulk, bench_open, bench_reference);
criterion_main!(benches);
