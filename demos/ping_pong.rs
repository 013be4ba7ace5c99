// In demos/ping_pong.rs
//
// Two workers share one queue pool. "thread[1]" sends a command to
// "thread[2]" once a second; "thread[2]" answers every command with a result
// on the queue named by the command's reply address.
//
// CCQ_RUN_SECS sets how long the demo runs (default 5).
use ccq_msgqueue::{Packet, QueueHandle, QueueManager, WorkerBuilder, WorkerContext, WorkerTask};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

struct Commander {
    peer: QueueHandle,
    last_sent: Instant,
}

impl WorkerTask for Commander {
    fn on_packet(&mut self, _ctx: &WorkerContext, packet: &mut Packet) {
        let sender = packet.sender().to_string();
        let json_text = packet.get_serialized().unwrap_or_default().to_string();
        match packet.get_structured() {
            Some(value) if value["action"] == "result" => {
                info!("recv: sender = {}", sender);
                info!("recv: json   = {}", json_text);
                info!("recv: value  = {}", value["value"]);
            }
            Some(value) => warn!("recv: unknown action={}", value["action"]),
            None => warn!("recv: empty payload from {}", sender),
        }
    }

    fn on_tick(&mut self, ctx: &WorkerContext) {
        if self.last_sent.elapsed() >= Duration::from_secs(1) {
            self.last_sent = Instant::now();
            ctx.request_json(&self.peer, json!({"action": "command"}));
        }
    }
}

struct Responder;

impl WorkerTask for Responder {
    fn on_packet(&mut self, ctx: &WorkerContext, packet: &mut Packet) {
        let is_command = packet
            .get_structured()
            .is_some_and(|v| v["action"] == "command");
        if is_command {
            info!("recv: command from {}", packet.sender());
            if !ctx.reply_json(packet, json!({"action": "result", "value": "ok"})) {
                warn!("recv: command from {} has no reply address", packet.sender());
            }
        } else {
            warn!("recv: unexpected packet from {}", packet.sender());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let run_secs = std::env::var("CCQ_RUN_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);

    let manager = Arc::new(QueueManager::new());

    let mut th2 = WorkerBuilder::new(Arc::clone(&manager))
        .with_nickname("thread[2]")
        .spawn(Responder)?;
    let mut th1 = WorkerBuilder::new(Arc::clone(&manager))
        .with_nickname("thread[1]")
        .spawn(Commander {
            peer: th2.inbox(),
            last_sent: Instant::now(),
        })?;

    std::thread::sleep(Duration::from_secs(run_secs));

    th1.shutdown()?;
    th2.shutdown()?;
    drop((th1, th2));
    info!("{:?}", manager);
    Ok(())
}
