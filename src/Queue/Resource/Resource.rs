// One pooled queue: a FIFO of packets guarded by a single mutex and condition variable

use crate::Core::Packet;
use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// Everything the resource mutex protects.
///
/// Kept in one struct so the enabled flag and the packet sequence are always
/// read and written together.
pub(crate) struct QueueState {
    /// Pending packets. Push at the back, pop at the front.
    pub(crate) packets: VecDeque<Packet>,

    /// `false` once the owner released the queue back to the pool.
    /// While disabled, `packets` is empty and pushes are dropped.
    pub(crate) enabled: bool,
}

/// A synchronized FIFO of [`Packet`]s that can be switched off and on again.
///
/// ### Lifecycle:
/// - Created enabled by the [`QueueManager`](crate::Queue::QueueManager).
/// - `disable()` empties the queue, rejects further pushes and wakes every waiter.
/// - `enable()` makes it usable again; this is how the manager recycles a queue.
///
/// The object itself is never freed while its manager is alive, so the
/// queue id handed out for it stays meaningful for the life of the pool.
///
/// ### Concurrency Design:
/// - Every operation takes `state` for a short, non-blocking critical section.
/// - `wait` is the only blocking call and parks on `ready` until a push,
///   a disable, or the timeout.
pub struct QueueResource {
    /// Pool index of this queue.
    pub(crate) qid: usize,

    /// Packets and enabled flag.
    /// Padded so neighbouring resources in the pool do not share a cache line.
    pub(crate) state: CachePadded<Mutex<QueueState>>,

    /// Signalled once per push, and broadcast on disable.
    pub(crate) ready: Condvar,
}
