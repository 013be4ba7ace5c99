use crate::Queue::{QueueHandle, QueueResource};
use std::sync::Arc;
use tracing::{debug, warn};
mod debug;
mod getters;

// Use parking_lot's Mutex for better performance
use parking_lot::Mutex;

/// Pool of reusable queues indexed by small integer ids.
///
/// The pool is an append-only arena: a resource placed at index `i` stays at
/// index `i` until the manager is dropped, and is never replaced. Releasing a
/// queue only disables it; a later `acquire(None)` may enable it again under
/// the same id.
///
/// One manager is shared (behind an `Arc`) by all workers that talk to each
/// other. There is no process-wide instance.
pub struct QueueManager {
    /// Guards membership and growth only. Queue contents are guarded by each
    /// resource's own lock, always taken after this one.
    resources: Mutex<Vec<Arc<QueueResource>>>,
}

impl Default for QueueManager {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueManager {
    pub fn new() -> Self {
        Self {
            resources: Mutex::new(Vec::new()),
        }
    }

    /// Create an empty pool with room for `capacity` queues before it grows.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            resources: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Get a handle to a queue.
    ///
    /// With `None`, recycle the first disabled queue (enabling it) or, if every
    /// queue is in use, append a new one. Finding a recyclable queue is a linear
    /// scan, O(n) in the number of queues ever created.
    ///
    /// With `Some(id)`, return a handle to that existing queue without touching
    /// its state. An id that was never allocated yields an unbound handle.
    pub fn acquire(&self, id: Option<usize>) -> QueueHandle {
        let mut resources = self.resources.lock();

        if let Some(qid) = id {
            return match resources.get(qid) {
                Some(resource) => QueueHandle::bound(Arc::clone(resource)),
                None => {
                    warn!(qid, count = resources.len(), "acquire: no such queue");
                    QueueHandle::unbound()
                }
            };
        }

        // Scan and enable under the structural lock so two callers cannot
        // claim the same disabled queue.
        if let Some(resource) = resources.iter().find(|r| !r.is_enabled()) {
            resource.enable();
            debug!(qid = resource.qid(), "recycled queue");
            return QueueHandle::bound(Arc::clone(resource));
        }

        let qid = resources.len();
        let resource = Arc::new(QueueResource::new(qid));
        resources.push(Arc::clone(&resource));
        debug!(qid, "allocated queue");
        QueueHandle::bound(resource)
    }

    /// Hand a queue back to the pool.
    ///
    /// The queue is disabled: pending packets are dropped and waiters are woken.
    /// Returns false if the handle is unbound or does not belong to this pool.
    pub fn release(&self, handle: &QueueHandle) -> bool {
        let resources = self.resources.lock();

        let Some(qid) = handle.id() else {
            warn!("release: unbound handle");
            return false;
        };
        match (resources.get(qid), handle.resource()) {
            (Some(slot), Some(resource)) if Arc::ptr_eq(slot, resource) => {
                slot.disable();
                debug!(qid, "released queue");
                true
            }
            _ => {
                warn!(qid, "release: handle does not belong to this pool");
                false
            }
        }
    }
}
