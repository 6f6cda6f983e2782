//! Blocking & Concurrency Tests
//!
//! Verifies the consumer's wait behaviour and cross-thread hand-off.
//! - Timeouts expire on an empty queue, polls return at once
//! - A push wakes a blocked consumer without waiting out its timeout
//! - Many producers, one consumer: nothing lost, nothing duplicated

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used)]

use ferrule_queue::{bytes, value, Timeout};
use std::thread;
use std::time::{Duration, Instant};

// =============================================================================
// TIMEOUTS
// =============================================================================

#[test]
fn test_pop_times_out_on_empty_queue() {
    let (_tx, mut rx) = value::bounded::<u32>(4).unwrap();

    let start = Instant::now();
    assert_eq!(rx.pop(Timeout::from_millis(500)), None);
    let waited = start.elapsed();

    assert!(waited >= Duration::from_millis(500), "returned early: {waited:?}");
    assert!(waited < Duration::from_millis(650), "overslept: {waited:?}");
}

#[test]
fn test_poll_returns_immediately() {
    let (_tx, mut rx) = bytes::bounded(4, 8).unwrap();
    let start = Instant::now();
    assert!(rx.pop_begin(Timeout::Poll).is_none());
    assert!(rx.pop_latest_begin(Timeout::from_millis(0)).is_none());
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[test]
fn test_stale_wakeup_does_not_end_wait() {
    let (tx, mut rx) = value::bounded(4).unwrap();
    // Leaves the wake flag set with the item already taken.
    tx.push(1).unwrap();
    assert_eq!(rx.pop(Timeout::Poll), Some(1));

    let start = Instant::now();
    assert_eq!(rx.pop(Timeout::After(Duration::from_millis(100))), None);
    assert!(start.elapsed() >= Duration::from_millis(100));
}

// =============================================================================
// WAKEUP
// =============================================================================

#[test]
fn test_push_wakes_blocked_pop() {
    const ROUNDS: usize = 5;
    let mut worst = Duration::ZERO;

    for round in 0..ROUNDS {
        let (tx, mut rx) = value::bounded(4).unwrap();

        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            let pushed_at = Instant::now();
            tx.push(round).unwrap();
            pushed_at
        });

        let item = rx.pop(Timeout::from_millis(500));
        let woke_at = Instant::now();
        let pushed_at = producer.join().unwrap();

        assert_eq!(item, Some(round));
        assert!(woke_at >= pushed_at);
        worst = worst.max(woke_at.duration_since(pushed_at));
    }

    // Woken by the push, not by the 500 ms deadline.
    assert!(
        worst < Duration::from_millis(20),
        "woke {worst:?} after the push"
    );
}

#[test]
fn test_forever_waits_for_bytes() {
    let (mut tx, mut rx) = bytes::bounded(2, 16).unwrap();

    let producer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        let mut slot = tx.push_begin().unwrap();
        slot[..5].copy_from_slice(b"hello");
        slot.commit(5);
    });

    let item = rx.pop_begin(Timeout::Forever).unwrap();
    assert_eq!(&*item, b"hello");
    drop(item);
    producer.join().unwrap();
}

// =============================================================================
// CONCURRENT HAND-OFF
// =============================================================================

#[test]
fn test_many_producers_one_consumer() {
    const PRODUCERS: u32 = 4;
    const PER_PRODUCER: u32 = 2_000;

    let (tx, mut rx) = value::bounded::<(u32, u32)>(16).unwrap();

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let tx = tx.clone();
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    let mut item = (p, seq);
                    // Producers never block: spin on backpressure.
                    while let Err(back) = tx.push(item) {
                        item = back;
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();
    drop(tx);

    let mut next = vec![0u32; PRODUCERS as usize];
    for _ in 0..PRODUCERS * PER_PRODUCER {
        let (p, seq) = rx.pop(Timeout::from_millis(10_000)).unwrap();
        // Per-producer order survives interleaving.
        assert_eq!(seq, next[p as usize]);
        next[p as usize] += 1;
    }

    for h in handles {
        h.join().unwrap();
    }
    assert!(rx.is_empty());
    assert!(next.iter().all(|&n| n == PER_PRODUCER));
}

#[test]
fn test_spsc_bytes_stream() {
    const ITEMS: u32 = 10_000;
    let (mut tx, mut rx) = bytes::bounded(8, 4).unwrap();

    let producer = thread::spawn(move || {
        for i in 0..ITEMS {
            while !tx.push(&i.to_le_bytes()) {
                thread::yield_now();
            }
        }
    });

    for i in 0..ITEMS {
        let item = rx.pop_begin(Timeout::from_millis(10_000)).unwrap();
        assert_eq!(u32::from_le_bytes(item[..].try_into().unwrap()), i);
    }
    producer.join().unwrap();
}

#[test]
fn test_pop_latest_under_load_is_monotonic() {
    const ITEMS: u64 = 5_000;
    let (tx, mut rx) = value::bounded::<u64>(4).unwrap();

    let producer = thread::spawn(move || {
        for i in 0..ITEMS {
            while tx.push(i).is_err() {
                thread::yield_now();
            }
        }
    });

    let mut last = None;
    while last != Some(ITEMS - 1) {
        let v = rx.pop_latest(Timeout::from_millis(10_000)).unwrap();
        if let Some(prev) = last {
            assert!(v > prev, "went backwards: {prev} then {v}");
        }
        last = Some(v);
    }
    producer.join().unwrap();
}
