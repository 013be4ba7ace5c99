use ccq_msgqueue::{Packet, QueueManager};
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn packet(sender: &str, n: u64) -> Packet {
    Packet::from_structured(sender, json!({ "n": n }))
}

fn n_of(mut packet: Packet) -> u64 {
    packet
        .get_structured()
        .and_then(|v| v["n"].as_u64())
        .expect("packet carries n")
}

#[test]
fn pop_order_matches_push_order() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);

    let count = fastrand::u64(50..200);
    for i in 0..count {
        assert!(queue.push(packet("p", i)));
    }
    assert_eq!(queue.len() as u64, count);

    for i in 0..count {
        assert_eq!(queue.pop().map(n_of), Some(i));
    }
    assert!(queue.pop().is_none());
    assert!(queue.is_empty());
}

#[test]
fn peek_front_leaves_packet_queued() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);
    assert!(queue.peek_front().is_none());

    queue.push(packet("p", 1));
    queue.push(packet("p", 2));

    assert_eq!(queue.peek_front().map(n_of), Some(1));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pop().map(n_of), Some(1));
    assert_eq!(queue.peek_front().map(n_of), Some(2));
}

#[test]
fn with_front_caches_conversion_in_place() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);
    queue.push(Packet::from_serialized("th1", r#"{"action":"command"}"#));

    let action = queue.with_front(|p| {
        p.get_structured()
            .and_then(|v| v["action"].as_str())
            .map(str::to_owned)
    });
    assert_eq!(action, Some(Some("command".to_string())));

    let popped = queue.pop().expect("still queued");
    assert!(popped.has_structured());
    assert!(popped.has_serialized());
}

#[test]
fn pop_with_removes_only_on_success() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);
    queue.push(packet("p", 1));
    queue.push(packet("p", 2));

    let refused: Option<Result<(), &str>> = queue.pop_with(|_| Err("not yet"));
    assert_eq!(refused, Some(Err("not yet")));
    assert_eq!(queue.len(), 2);

    let taken = queue.pop_with(|p| Ok::<_, ()>(p.sender().to_string()));
    assert_eq!(taken, Some(Ok("p".to_string())));
    assert_eq!(queue.pop().map(n_of), Some(2));
    assert_eq!(queue.pop_with(|_| Ok::<_, ()>(())), None);
}

#[test]
fn disable_clears_and_drops_pushes_until_enabled() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);
    queue.push(packet("p", 1));
    queue.push(packet("p", 2));

    assert!(manager.release(&queue));
    assert!(!queue.is_enabled());
    assert!(queue.is_empty());

    assert!(!queue.push(packet("p", 3)));
    assert!(queue.is_empty());
    assert!(queue.pop().is_none());
    assert!(queue.peek_front().is_none());

    let again = manager.acquire(None);
    assert_eq!(again.id(), queue.id());
    assert!(queue.is_enabled());
    assert!(queue.push(packet("p", 4)));
    assert_eq!(again.pop().map(n_of), Some(4));
}

#[test]
#[serial]
fn wait_times_out_on_empty_queue() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);

    let start = Instant::now();
    assert!(!queue.wait_ms(500));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(500), "woke early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "overslept: {:?}", elapsed);
}

#[test]
fn wait_returns_at_once_when_data_is_ready() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);
    queue.push(packet("p", 1));

    let start = Instant::now();
    assert!(queue.wait(Some(Duration::from_secs(5))));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn wait_accepts_timeouts_past_the_clock_range() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);
    queue.push(packet("p", 1));

    assert!(queue.wait(Some(Duration::MAX)));
    assert!(queue.wait_ms(i64::MAX));
}

#[test]
#[serial]
fn wait_wakes_on_push_from_other_thread() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);

    let producer = {
        let queue = queue.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            queue.push(packet("producer", 7));
        })
    };

    let start = Instant::now();
    assert!(queue.wait_ms(0));
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(queue.pop().map(n_of), Some(7));
    producer.join().unwrap();
}

#[test]
#[serial]
fn disable_releases_unbounded_waiters() {
    let manager = Arc::new(QueueManager::new());
    let queue = manager.acquire(None);

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let queue = queue.clone();
            thread::spawn(move || queue.wait(None))
        })
        .collect();

    thread::sleep(Duration::from_millis(100));
    assert!(manager.release(&queue));

    for waiter in waiters {
        assert!(!waiter.join().unwrap(), "waiter saw data on a disabled queue");
    }
}

#[test]
fn wait_on_disabled_queue_returns_false_immediately() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);
    manager.release(&queue);

    let start = Instant::now();
    assert!(!queue.wait(None));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn per_producer_order_survives_concurrent_pushes() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);

    let producers = 4;
    let per_producer = 1000u64;

    crossbeam_utils::thread::scope(|s| {
        for p in 0..producers {
            let queue = &queue;
            s.spawn(move |_| {
                let sender = format!("p{}", p);
                for i in 0..per_producer {
                    queue.push(packet(&sender, i));
                    if fastrand::u8(..) == 0 {
                        thread::yield_now();
                    }
                }
            });
        }
    })
    .unwrap();

    let mut next = vec![0u64; producers];
    while let Some(p) = queue.pop() {
        let idx: usize = p.sender()[1..].parse().unwrap();
        let n = n_of(p);
        assert_eq!(n, next[idx], "producer {} out of order", idx);
        next[idx] += 1;
    }
    assert!(next.iter().all(|&n| n == per_producer));
}

#[test]
fn consumers_split_the_stream_without_loss() {
    let manager = QueueManager::new();
    let queue = manager.acquire(None);
    let total = 2000u64;

    let received: Vec<Vec<u64>> = crossbeam_utils::thread::scope(|s| {
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = &queue;
                s.spawn(move |_| {
                    let mut seen = Vec::new();
                    loop {
                        if !queue.wait(Some(Duration::from_millis(200))) {
                            break;
                        }
                        while let Some(p) = queue.pop() {
                            seen.push(n_of(p));
                        }
                    }
                    seen
                })
            })
            .collect();

        for i in 0..total {
            queue.push(packet("producer", i));
        }
        consumers.into_iter().map(|c| c.join().unwrap()).collect()
    })
    .unwrap();

    for seen in &received {
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "a consumer saw reordering");
    }
    let mut all: Vec<u64> = received.into_iter().flatten().collect();
    all.sort_unstable();
    assert_eq!(all, (0..total).collect::<Vec<_>>());
}
