/*!
 * Turn-Alternating Coordinator Integration Tests
 *
 * Strict put/take alternation regardless of capacity, initial producer
 * turn, and group-level progress
 */

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use turnwise::{AlternatingBuffer, CancelToken, Turn};

#[test]
fn test_occupancy_never_exceeds_one() {
    // Capacity is 10, but strict alternation means a second put cannot
    // succeed before the first take: sampled occupancy stays <= 1.
    let buffer = Arc::new(AlternatingBuffer::new(10));
    let done = Arc::new(AtomicBool::new(false));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let sampler = {
        let buffer = buffer.clone();
        let done = done.clone();
        let max_seen = max_seen.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                max_seen.fetch_max(buffer.len(), Ordering::Relaxed);
                thread::sleep(Duration::from_micros(100));
            }
        })
    };

    let producer = {
        let buffer = buffer.clone();
        thread::spawn(move || {
            let token = CancelToken::new();
            for i in 0..20u64 {
                buffer.put(i, &token).unwrap();
            }
        })
    };

    let token = CancelToken::new();
    let taken: Vec<u64> = (0..20).map(|_| buffer.take(&token).unwrap()).collect();

    producer.join().unwrap();
    done.store(true, Ordering::Relaxed);
    sampler.join().unwrap();

    assert_eq!(taken, (0..20u64).collect::<Vec<_>>());
    assert_eq!(buffer.len(), 0);
    assert!(
        max_seen.load(Ordering::Relaxed) <= 1,
        "alternation violated: occupancy reached {}",
        max_seen.load(Ordering::Relaxed)
    );
}

#[test]
fn test_consumer_blocks_until_first_put() {
    // Producers move first: a consumer arriving early must park.
    let buffer = Arc::new(AlternatingBuffer::new(5));
    let returned = Arc::new(AtomicBool::new(false));
    assert_eq!(buffer.turn(), Turn::Producers);
    assert_eq!(buffer.capacity(), 5);
    assert!(buffer.is_empty());

    let consumer = {
        let buffer = buffer.clone();
        let returned = returned.clone();
        thread::spawn(move || {
            let item = buffer.take(&CancelToken::new()).unwrap();
            returned.store(true, Ordering::SeqCst);
            item
        })
    };

    thread::sleep(Duration::from_millis(80));
    assert!(!returned.load(Ordering::SeqCst));

    buffer.put(13u64, &CancelToken::new()).unwrap();
    assert_eq!(consumer.join().unwrap(), 13);
    assert_eq!(buffer.turn(), Turn::Producers);
    assert!(buffer.is_empty());
}

#[test]
fn test_two_by_two_terminates_and_alternates() {
    let buffer = Arc::new(AlternatingBuffer::new(10));
    let done = Arc::new(AtomicBool::new(false));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let sampler = {
        let buffer = buffer.clone();
        let done = done.clone();
        let max_seen = max_seen.clone();
        thread::spawn(move || {
            while !done.load(Ordering::Relaxed) {
                max_seen.fetch_max(buffer.len(), Ordering::Relaxed);
                thread::sleep(Duration::from_micros(100));
            }
        })
    };

    let producers: Vec<_> = (0..2)
        .map(|p| {
            let buffer = buffer.clone();
            thread::spawn(move || {
                let token = CancelToken::new();
                for i in 0..5 {
                    buffer.put((p * 5 + i) as u64, &token).unwrap();
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let buffer = buffer.clone();
            thread::spawn(move || {
                let token = CancelToken::new();
                (0..5)
                    .map(|_| buffer.take(&token).unwrap())
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }
    let mut all_taken: Vec<u64> = consumers
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    done.store(true, Ordering::Relaxed);
    sampler.join().unwrap();

    all_taken.sort_unstable();
    assert_eq!(all_taken, (0..10u64).collect::<Vec<_>>());
    assert_eq!(buffer.len(), 0);
    assert!(max_seen.load(Ordering::Relaxed) <= 1);
}
