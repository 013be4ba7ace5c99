use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace};

use super::Resource::{QueueResource, QueueState};
use crate::Core::Packet;

impl QueueResource {
    /// Create an enabled, empty queue for pool slot `qid`.
    pub(crate) fn new(qid: usize) -> Self {
        Self {
            qid,
            state: CachePadded::new(Mutex::new(QueueState {
                packets: VecDeque::new(),
                enabled: true,
            })),
            ready: Condvar::new(),
        }
    }

    /// Pool index of this queue.
    #[inline]
    pub fn qid(&self) -> usize {
        self.qid
    }

    /// Append a packet and wake one waiter.
    /// Returns `false` (and drops the packet) if the queue is disabled.
    pub fn push(&self, packet: Packet) -> bool {
        let mut state = self.state.lock();
        if !state.enabled {
            trace!(qid = self.qid, sender = packet.sender(), "push to disabled queue dropped");
            return false;
        }
        state.packets.push_back(packet);
        self.ready.notify_one();
        true
    }

    /// Remove and return the oldest packet.
    /// Returns None if the queue is empty or disabled.
    pub fn pop(&self) -> Option<Packet> {
        let mut state = self.state.lock();
        if !state.enabled {
            return None;
        }
        state.packets.pop_front()
    }

    /// Copy of the oldest packet, leaving it queued.
    pub fn peek_front(&self) -> Option<Packet> {
        let state = self.state.lock();
        if !state.enabled {
            return None;
        }
        state.packets.front().cloned()
    }

    /// Run `f` on the oldest packet in place, leaving it queued.
    ///
    /// Conversions done through the `&mut Packet` are cached in the queued
    /// packet. `f` runs with the queue locked and must not call back into
    /// this queue.
    pub fn with_front<R>(&self, f: impl FnOnce(&mut Packet) -> R) -> Option<R> {
        let mut state = self.state.lock();
        if !state.enabled {
            return None;
        }
        state.packets.front_mut().map(f)
    }

    /// Run `f` on the oldest packet and remove it only if `f` returns `Ok`.
    ///
    /// The check and the removal happen under one lock, so a concurrent
    /// consumer cannot take the packet in between. On `Err` the packet stays
    /// at the head. Same locking rule as [`QueueResource::with_front`].
    pub fn pop_with<T, E>(
        &self,
        f: impl FnOnce(&mut Packet) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut state = self.state.lock();
        if !state.enabled {
            return None;
        }
        let result = f(state.packets.front_mut()?);
        if result.is_ok() {
            state.packets.pop_front();
        }
        Some(result)
    }

    /// Block until the queue holds a packet, the queue is disabled, or the
    /// timeout elapses. `None` waits without a deadline.
    ///
    /// Returns true only if the queue is enabled and non-empty on return.
    /// The enabled flag is checked on every wake, so a disable releases
    /// every waiter, including ones waiting without a deadline.
    /// A timeout too large to express as an `Instant` waits without a deadline.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.state.lock();

        loop {
            if !state.enabled {
                return false;
            }
            if !state.packets.is_empty() {
                return true;
            }
            match deadline {
                None => self.ready.wait(&mut state),
                Some(deadline) => {
                    if self.ready.wait_until(&mut state, deadline).timed_out() {
                        return state.enabled && !state.packets.is_empty();
                    }
                }
            }
        }
    }

    /// Millisecond form of [`QueueResource::wait`]: `timeout_ms <= 0` waits
    /// without a deadline.
    pub fn wait_ms(&self, timeout_ms: i64) -> bool {
        if timeout_ms <= 0 {
            self.wait(None)
        } else {
            self.wait(Some(Duration::from_millis(timeout_ms as u64)))
        }
    }

    pub fn enable(&self) {
        let mut state = self.state.lock();
        state.enabled = true;
        debug!(qid = self.qid, "queue enabled");
    }

    /// Drop every pending packet and reject pushes until the next `enable()`.
    /// Wakes all threads parked in `wait`.
    pub fn disable(&self) {
        let mut state = self.state.lock();
        let dropped = state.packets.len();
        state.packets.clear();
        state.enabled = false;
        self.ready.notify_all();
        debug!(qid = self.qid, dropped, "queue disabled");
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().packets.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    /// Number of pending packets.
    pub fn len(&self) -> usize {
        self.state.lock().packets.len()
    }
}
