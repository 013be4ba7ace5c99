// In demos/hash_relay.rs
//
// A producer worker hashes numbered messages and pushes them to a consumer
// worker, which recomputes every hash and counts mismatches.
//
// cargo run --example hash_relay -- <num_messages> [--auto-exit]
use ccq_msgqueue::{Packet, QueueHandle, QueueManager, WorkerBuilder, WorkerContext, WorkerTask};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::env;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn digest(i: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("message_{}", i).as_bytes());
    format!("{:x}", hasher.finalize())
}

struct Verifier {
    received: Arc<AtomicUsize>,
    mismatches: Arc<AtomicUsize>,
}

impl WorkerTask for Verifier {
    fn on_start(&mut self, ctx: &WorkerContext) {
        tracing::info!("{}: waiting on queue {:?}", ctx.nickname(), ctx.inbox().id());
    }

    fn on_packet(&mut self, _ctx: &WorkerContext, packet: &mut Packet) {
        let Some(value) = packet.get_structured() else {
            self.mismatches.fetch_add(1, Ordering::Relaxed);
            return;
        };
        let index = value["index"].as_u64().unwrap_or(u64::MAX) as usize;
        if value["hash"].as_str() != Some(digest(index).as_str()) {
            self.mismatches.fetch_add(1, Ordering::Relaxed);
        }
        let received = self.received.fetch_add(1, Ordering::Relaxed) + 1;
        if received % 100 == 0 {
            tracing::info!("--- Received {} messages ---", received);
        }
    }
}

/// Pushes a batch of hashed messages per tick until `total` are sent.
struct Hasher {
    target: QueueHandle,
    next: usize,
    total: usize,
    keep_alive: Arc<AtomicBool>,
    sent: Arc<AtomicUsize>,
}

const BATCH: usize = 64;

impl WorkerTask for Hasher {
    fn on_packet(&mut self, _ctx: &WorkerContext, packet: &mut Packet) {
        tracing::warn!("producer ignores packet from {}", packet.sender());
    }

    fn on_tick(&mut self, ctx: &WorkerContext) {
        let end = (self.next + BATCH).min(self.total);
        while self.next < end {
            let value = json!({ "index": self.next, "hash": digest(self.next) });
            if !ctx.send_json(&self.target, value) {
                tracing::error!("consumer queue was released");
                ctx.stop();
                return;
            }
            self.next += 1;
        }
        self.sent.store(self.next, Ordering::Relaxed);
        if self.next == self.total || !self.keep_alive.load(Ordering::SeqCst) {
            ctx.stop();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <num_messages> [--auto-exit]", args[0]);
        std::process::exit(1);
    }
    let num_messages: usize = args[1].parse()?;
    let auto_exit = args.get(2).map(|s| s == "--auto-exit").unwrap_or(false);

    let manager = Arc::new(QueueManager::new());
    let received = Arc::new(AtomicUsize::new(0));
    let mismatches = Arc::new(AtomicUsize::new(0));

    let consumer = WorkerBuilder::new(Arc::clone(&manager))
        .with_nickname("consumer")
        .spawn(Verifier {
            received: Arc::clone(&received),
            mismatches: Arc::clone(&mismatches),
        })?;

    let keep_alive = Arc::new(AtomicBool::new(true));
    let keep_alive_for_handler = Arc::clone(&keep_alive);
    ctrlc::set_handler(move || {
        keep_alive_for_handler.store(false, Ordering::SeqCst);
    })?;

    let start = Instant::now();
    let sent = Arc::new(AtomicUsize::new(0));
    let mut producer = WorkerBuilder::new(Arc::clone(&manager))
        .with_nickname("producer")
        .with_wait_interval(Duration::from_millis(1))
        .spawn(Hasher {
            target: consumer.inbox(),
            next: 0,
            total: num_messages,
            keep_alive: Arc::clone(&keep_alive),
            sent: Arc::clone(&sent),
        })?;

    while producer.is_running() {
        std::thread::sleep(Duration::from_millis(10));
    }
    producer.join()?;
    let sent = sent.load(Ordering::Relaxed);
    tracing::info!("Producer: Sent {} messages in {:.2?}", sent, start.elapsed());

    let deadline = Instant::now() + Duration::from_secs(5);
    while received.load(Ordering::Relaxed) < sent && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }

    if !auto_exit {
        println!("Press Ctrl+C to exit...");
        while keep_alive.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(100));
        }
    }

    let elapsed = start.elapsed();
    println!(
        "Consumer: Received {} messages in {:.2?} ({} mismatched)",
        received.load(Ordering::Relaxed),
        elapsed,
        mismatches.load(Ordering::Relaxed)
    );
    println!(
        "Average: {:.2} messages/second",
        received.load(Ordering::Relaxed) as f64 / elapsed.as_secs_f64()
    );
    println!("{:?}", manager);
    drop(consumer);
    Ok(())
}
