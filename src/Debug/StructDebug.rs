use std::fmt;
use crate::Queue::{QueueHandle, QueueManager, QueueResource};
use crate::Worker::WorkerThread;

/// Debug function for QueueManager
///
/// Provides a summary instead of dumping every queue:
/// - Number of queues ever created
/// - How many are handed out and how many wait for recycling
/// - Packets pending across the pool
pub fn debug_queue_manager(manager: &QueueManager, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("QueueManager")
        .field("queue_count", &manager.queue_count())
        .field("enabled", &manager.enabled_count())
        .field("disabled", &manager.disabled_count())
        .field("pending_packets", &manager.pending_packets())
        .finish()
}

/// Debug function for QueueResource
///
/// Shows the id, state and depth without printing packet contents
pub fn debug_queue_resource(resource: &QueueResource, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = resource.state.lock();
    f.debug_struct("QueueResource")
        .field("qid", &resource.qid)
        .field("enabled", &state.enabled)
        .field("pending", &state.packets.len())
        .finish()
}

/// Debug function for QueueHandle
pub fn debug_queue_handle(handle: &QueueHandle, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match handle.id() {
        Some(qid) => f.debug_tuple("QueueHandle").field(&qid).finish(),
        None => f.write_str("QueueHandle(<unbound>)"),
    }
}

/// Debug function for WorkerThread
pub fn debug_worker_thread(worker: &WorkerThread, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WorkerThread")
        .field("nickname", &worker.nickname())
        .field("inbox", &worker.inbox_id())
        .field("running", &worker.is_running())
        .finish_non_exhaustive()
}
