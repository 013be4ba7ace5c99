// src/Queue/handle.rs

use crate::Core::Packet;
use crate::Queue::QueueResource;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A lightweight reference to one pooled queue, as handed out by
/// [`QueueManager::acquire`](crate::Queue::QueueManager::acquire).
///
/// Cloning a handle is cheap and every clone talks to the same queue.
/// Dropping a handle does nothing; a queue goes back to the pool only
/// through [`QueueManager::release`](crate::Queue::QueueManager::release).
///
/// An unbound handle (from an invalid id, or `Default`) accepts every call
/// and does nothing: pushes are dropped, pops and peeks return `None`,
/// `wait` returns false immediately.
#[derive(Clone, Default)]
pub struct QueueHandle {
    resource: Option<Arc<QueueResource>>,
}

impl QueueHandle {
    pub(crate) fn bound(resource: Arc<QueueResource>) -> Self {
        Self {
            resource: Some(resource),
        }
    }

    pub(crate) fn unbound() -> Self {
        Self { resource: None }
    }

    pub(crate) fn resource(&self) -> Option<&Arc<QueueResource>> {
        self.resource.as_ref()
    }

    /// Queue id, or `None` for an unbound handle.
    pub fn id(&self) -> Option<usize> {
        self.resource.as_ref().map(|r| r.qid())
    }

    pub fn is_bound(&self) -> bool {
        self.resource.is_some()
    }

    /// Returns true if the packet was queued.
    pub fn push(&self, packet: Packet) -> bool {
        self.resource.as_ref().is_some_and(|r| r.push(packet))
    }

    /// Queue a structured packet built from `sender` and `value`.
    pub fn push_json(&self, sender: impl Into<String>, value: Value) -> bool {
        self.push(Packet::from_structured(sender, value))
    }

    pub fn pop(&self) -> Option<Packet> {
        self.resource.as_ref().and_then(|r| r.pop())
    }

    pub fn peek_front(&self) -> Option<Packet> {
        self.resource.as_ref().and_then(|r| r.peek_front())
    }

    /// See [`QueueResource::with_front`].
    pub fn with_front<R>(&self, f: impl FnOnce(&mut Packet) -> R) -> Option<R> {
        self.resource.as_ref().and_then(|r| r.with_front(f))
    }

    /// See [`QueueResource::pop_with`].
    pub fn pop_with<T, E>(
        &self,
        f: impl FnOnce(&mut Packet) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        self.resource.as_ref().and_then(|r| r.pop_with(f))
    }

    /// See [`QueueResource::wait`].
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        self.resource.as_ref().is_some_and(|r| r.wait(timeout))
    }

    /// See [`QueueResource::wait_ms`].
    pub fn wait_ms(&self, timeout_ms: i64) -> bool {
        self.resource.as_ref().is_some_and(|r| r.wait_ms(timeout_ms))
    }

    pub fn is_empty(&self) -> bool {
        self.resource.as_ref().map_or(true, |r| r.is_empty())
    }

    pub fn is_enabled(&self) -> bool {
        self.resource.as_ref().is_some_and(|r| r.is_enabled())
    }

    pub fn len(&self) -> usize {
        self.resource.as_ref().map_or(0, |r| r.len())
    }
}
