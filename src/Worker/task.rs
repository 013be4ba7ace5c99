use crate::Core::Packet;
use crate::Queue::{QueueHandle, QueueManager};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The body of a worker thread.
///
/// The run loop calls `on_start` once, then repeatedly waits on the inbox,
/// hands every queued packet to `on_packet` in arrival order and calls
/// `on_tick`, until the worker is stopped. `on_stop` runs last, on the same
/// thread.
pub trait WorkerTask: Send + 'static {
    fn on_start(&mut self, _ctx: &WorkerContext) {}

    fn on_packet(&mut self, ctx: &WorkerContext, packet: &mut Packet);

    /// Called once per loop iteration, after the inbox has been drained.
    /// With an idle inbox this runs roughly every wait interval.
    fn on_tick(&mut self, _ctx: &WorkerContext) {}

    fn on_stop(&mut self, _ctx: &WorkerContext) {}
}

impl<F> WorkerTask for F
where
    F: FnMut(&WorkerContext, &mut Packet) + Send + 'static,
{
    fn on_packet(&mut self, ctx: &WorkerContext, packet: &mut Packet) {
        self(ctx, packet)
    }
}

/// What a running task can see of its worker.
#[derive(Clone)]
pub struct WorkerContext {
    pub(crate) nickname: Arc<str>,
    pub(crate) inbox: QueueHandle,
    pub(crate) manager: Arc<QueueManager>,
    pub(crate) running: Arc<AtomicBool>,
}

impl WorkerContext {
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// This worker's own queue.
    pub fn inbox(&self) -> &QueueHandle {
        &self.inbox
    }

    /// The pool shared with the other workers.
    pub fn manager(&self) -> &Arc<QueueManager> {
        &self.manager
    }

    /// Whether the run loop should keep going.
    pub fn loop_continue(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask the run loop to exit after the current packet.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Push `value` to `target`, tagged with this worker's nickname.
    pub fn send_json(&self, target: &QueueHandle, value: Value) -> bool {
        target.push_json(&*self.nickname, value)
    }

    /// Like [`WorkerContext::send_json`], but asks the receiver to answer
    /// on this worker's inbox.
    pub fn request_json(&self, target: &QueueHandle, value: Value) -> bool {
        let Some(qid) = self.inbox.id() else {
            return false;
        };
        target.push(Packet::from_structured(&*self.nickname, value).with_reply_to(qid))
    }

    /// Answer `request` on the queue it names as its reply address.
    /// Returns false if it names none, or the queue is unknown or disabled.
    pub fn reply_json(&self, request: &Packet, value: Value) -> bool {
        let Some(qid) = request.reply_to() else {
            return false;
        };
        self.send_json(&self.manager.acquire(Some(qid)), value)
    }
}
