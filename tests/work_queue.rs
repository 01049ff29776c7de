//! Bounded work queue behavior across threads.

use crossbeam_utils::thread;
use ferrous_registry::{kinds, Backpressure, Object, PushError, QueueClosedError, RegistryConfig, WorkQueue};
use std::collections::HashSet;
use std::sync::Barrier;
use std::time::Duration;

#[test]
fn test_bounded_fifo_with_blocked_producer() {
    let queue = WorkQueue::new(2);

    let received = thread::scope(|s| {
        let producer = s.spawn(|_| {
            queue.push("a").unwrap();
            queue.push("b").unwrap();
            // Blocks until the consumer makes room.
            queue.push("c").unwrap();
        });

        std::thread::sleep(Duration::from_millis(20));
        assert!(queue.len() <= 2);

        let received: Vec<_> = (0..3).map(|_| queue.pop().unwrap()).collect();
        producer.join().unwrap();
        received
    })
    .unwrap();

    assert_eq!(received, vec!["a", "b", "c"]);
    assert!(queue.is_empty());
}

#[test]
fn test_close_wakes_blocked_consumer() {
    let queue: WorkQueue<u32> = WorkQueue::new(1);

    thread::scope(|s| {
        let consumer = s.spawn(|_| queue.pop());
        std::thread::sleep(Duration::from_millis(20));
        queue.close();
        assert_eq!(consumer.join().unwrap(), Err(QueueClosedError));
    })
    .unwrap();
}

#[test]
fn test_close_wakes_blocked_producer_and_returns_item() {
    let queue = WorkQueue::new(1);
    queue.push(1u32).unwrap();

    thread::scope(|s| {
        let producer = s.spawn(|_| queue.push(2));
        std::thread::sleep(Duration::from_millis(20));
        queue.close();
        match producer.join().unwrap() {
            Err(PushError::Closed(item)) => assert_eq!(item, 2),
            other => panic!("expected a closed error, got {:?}", other),
        }
    })
    .unwrap();

    // Items queued before close are still delivered.
    assert_eq!(queue.pop(), Ok(1));
    assert_eq!(queue.pop(), Err(QueueClosedError));
}

#[test]
fn test_reject_policy_never_blocks() {
    let queue = WorkQueue::with_backpressure(2, Backpressure::Reject);
    queue.push('x').unwrap();
    queue.push('y').unwrap();

    let err = queue.push('z').unwrap_err();
    assert!(matches!(err, PushError::Full('z')));
    assert_eq!(err.to_string(), "Work queue is full");
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_every_item_delivered_exactly_once() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 3;
    const PER_PRODUCER: usize = 250;

    let queue = WorkQueue::new(8);
    let start = Barrier::new(PRODUCERS + CONSUMERS);

    let delivered: Vec<usize> = thread::scope(|s| {
        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let (queue, start) = (&queue, &start);
                s.spawn(move |_| {
                    start.wait();
                    for i in 0..PER_PRODUCER {
                        queue.push(p * PER_PRODUCER + i).unwrap();
                    }
                })
            })
            .collect();
        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                s.spawn(|_| {
                    start.wait();
                    let mut seen = Vec::new();
                    for item in queue.drain() {
                        assert!(queue.len() <= queue.capacity());
                        seen.push(item);
                    }
                    seen
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }
        queue.close();
        consumers
            .into_iter()
            .flat_map(|consumer| consumer.join().unwrap())
            .collect()
    })
    .unwrap();

    assert_eq!(delivered.len(), PRODUCERS * PER_PRODUCER);
    let unique: HashSet<_> = delivered.iter().copied().collect();
    assert_eq!(unique.len(), delivered.len());
}

#[test]
fn test_handing_resolved_objects_to_a_worker() {
    let queue: WorkQueue<Box<dyn Object>> =
        WorkQueue::from_config(&RegistryConfig::default()).unwrap();
    let registry = kinds().unwrap();

    let outputs = thread::scope(|s| {
        let worker = s.spawn(|_| {
            queue
                .drain()
                .map(|mut object| (object.kind(), object.handle("queue")))
                .collect::<Vec<_>>()
        });
        for key in ["Object2", "Object1", "Object2"] {
            assert!(queue.push(registry.resolve(key).unwrap()).is_ok());
        }
        queue.close();
        worker.join().unwrap()
    })
    .unwrap();

    assert_eq!(
        outputs,
        vec![("Object2", "eueuq".to_string()), ("Object1", "QUEUE".to_string()), ("Object2", "eueuq".to_string())]
    );
}
