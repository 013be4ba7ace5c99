use super::*;

/// Read-only views of the pool for monitoring and tests.
///
/// Each call takes the structural lock briefly; the numbers may be stale by
/// the time the caller looks at them.
impl QueueManager {
    /// Number of queues ever created. Ids `0..queue_count()` are valid.
    pub fn queue_count(&self) -> usize {
        self.resources.lock().len()
    }

    /// Number of queues currently handed out.
    pub fn enabled_count(&self) -> usize {
        self.resources
            .lock()
            .iter()
            .filter(|r| r.is_enabled())
            .count()
    }

    /// Number of released queues waiting to be recycled.
    pub fn disabled_count(&self) -> usize {
        self.resources
            .lock()
            .iter()
            .filter(|r| !r.is_enabled())
            .count()
    }

    /// Total packets pending across every queue in the pool.
    pub fn pending_packets(&self) -> usize {
        self.resources.lock().iter().map(|r| r.len()).sum()
    }
}
