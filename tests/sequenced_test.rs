/*!
 * Intra-Group Sequencer Integration Tests
 *
 * Liveness with fixed quotas, peer handoff at the final iteration, and
 * cancellation without stranding the group
 */

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use turnwise::{CancelToken, ConsumeCancelled, ProduceCancelled, SequencedBuffer};

#[test]
fn test_two_producers_two_consumers_nine_ops() {
    // The classic quota pattern: 2 producers and 2 consumers, 9
    // operations each. 18 puts and 18 takes must all complete with no
    // loss, no duplication, and an empty buffer at the end.
    const QUOTA: usize = 9;

    let buffer = Arc::new(SequencedBuffer::new(10));
    assert_eq!(buffer.capacity(), 10);

    let producers: Vec<_> = (0..2)
        .map(|p| {
            let buffer = buffer.clone();
            thread::spawn(move || {
                let token = CancelToken::new();
                buffer
                    .produce_run(QUOTA, |i| (p * QUOTA + i) as u64, &token)
                    .unwrap()
            })
        })
        .collect();

    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let buffer = buffer.clone();
            thread::spawn(move || {
                let token = CancelToken::new();
                buffer.consume_run(QUOTA, &token).unwrap()
            })
        })
        .collect();

    let produced: usize = producers.into_iter().map(|h| h.join().unwrap()).sum();
    let mut all_taken: Vec<u64> = consumers
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    assert_eq!(produced, 18);
    assert_eq!(all_taken.len(), 18);
    all_taken.sort_unstable();
    assert_eq!(all_taken, (0..18u64).collect::<Vec<_>>());
    assert_eq!(buffer.len(), 0);
    assert!(buffer.is_empty());
}

#[test]
fn test_single_pair_preserves_fifo() {
    let buffer = Arc::new(SequencedBuffer::new(4));
    let buffer_clone = buffer.clone();

    let producer = thread::spawn(move || {
        buffer_clone
            .produce_run(6, |i| i as u64, &CancelToken::new())
            .unwrap()
    });

    let taken = buffer.consume_run(6, &CancelToken::new()).unwrap();
    assert_eq!(producer.join().unwrap(), 6);
    assert_eq!(taken, (0..6u64).collect::<Vec<_>>());
}

#[test]
fn test_final_iteration_still_hands_off() {
    // Second producer starts parked mid-run; the first producer's last
    // iteration must still publish a handoff or the second would never
    // finish.
    const QUOTA: usize = 4;

    let buffer = Arc::new(SequencedBuffer::new(2));

    let producers: Vec<_> = (0..2)
        .map(|p| {
            let buffer = buffer.clone();
            thread::spawn(move || {
                let token = CancelToken::new();
                buffer
                    .produce_run(QUOTA, |i| (p * QUOTA + i) as u64, &token)
                    .unwrap()
            })
        })
        .collect();

    let consumer = {
        let buffer = buffer.clone();
        thread::spawn(move || buffer.consume_run(2 * QUOTA, &CancelToken::new()).unwrap())
    };

    let produced: usize = producers.into_iter().map(|h| h.join().unwrap()).sum();
    let taken = consumer.join().unwrap();

    assert_eq!(produced, 2 * QUOTA);
    assert_eq!(taken.len(), 2 * QUOTA);
    assert_eq!(buffer.len(), 0);
}

#[test]
fn test_cancelled_consume_run_keeps_partial_items() {
    // A consumer cancelled partway through its quota must hand back the
    // items it already dequeued instead of dropping them.
    let buffer = Arc::new(SequencedBuffer::new(4));
    assert_eq!(
        buffer.produce_run(2, |i| i as u64, &CancelToken::new()).unwrap(),
        2
    );

    let token = CancelToken::new();
    let consumer = {
        let buffer = buffer.clone();
        let token = token.clone();
        // Quota exceeds what will ever be produced: blocks on empty
        // after draining both items
        thread::spawn(move || buffer.consume_run(5, &token))
    };
    thread::sleep(Duration::from_millis(50));
    token.cancel();

    assert_eq!(
        consumer.join().unwrap(),
        Err(ConsumeCancelled { taken: vec![0, 1] })
    );
    assert_eq!(buffer.len(), 0);
}

#[test]
fn test_cancel_blocked_producer_does_not_strand_peers() {
    let buffer = Arc::new(SequencedBuffer::new(1));

    // Fill the single slot
    assert_eq!(
        buffer.produce_run(1, |_| 100u64, &CancelToken::new()).unwrap(),
        1
    );

    // This producer parks on the full buffer; cancel it
    let token = CancelToken::new();
    let blocked = {
        let buffer = buffer.clone();
        let token = token.clone();
        thread::spawn(move || buffer.produce_run(1, |_| 200u64, &token))
    };
    thread::sleep(Duration::from_millis(30));
    token.cancel();
    assert_eq!(
        blocked.join().unwrap(),
        Err(ProduceCancelled { produced: 0 })
    );

    // The buffer must be untouched by the cancelled put and still
    // drainable by a consumer
    assert_eq!(buffer.len(), 1);
    let taken = buffer.consume_run(1, &CancelToken::new()).unwrap();
    assert_eq!(taken, vec![100]);
    assert_eq!(buffer.len(), 0);

    // And new producers keep working afterwards
    assert_eq!(
        buffer.produce_run(1, |_| 300u64, &CancelToken::new()).unwrap(),
        1
    );
    assert_eq!(
        buffer.consume_run(1, &CancelToken::new()).unwrap(),
        vec![300]
    );
}
