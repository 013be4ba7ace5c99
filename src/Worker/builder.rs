use super::task::{WorkerContext, WorkerTask};
use super::WorkerThread;
use crate::error::WorkerError;
use crate::Queue::QueueManager;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// How long the run loop waits on an idle inbox before calling `on_tick`.
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(100);

/// Shorter intervals are raised to this so an idle worker never spins.
pub const MIN_WAIT_INTERVAL: Duration = Duration::from_millis(1);

pub struct WorkerBuilder {
    manager: Arc<QueueManager>,
    nickname: String,
    wait_interval: Duration,
    inbox_id: Option<usize>,
}

impl WorkerBuilder {
    pub fn new(manager: Arc<QueueManager>) -> Self {
        Self {
            manager,
            nickname: "worker".to_string(),
            wait_interval: DEFAULT_WAIT_INTERVAL,
            inbox_id: None,
        }
    }

    /// Name of the worker, used as the thread name, the sender tag of its
    /// outgoing packets and the tracing span.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = nickname.into();
        self
    }

    /// How long an idle run loop blocks before calling `on_tick`. Also bounds
    /// how long `stop()` takes to be noticed. Clamped to [`MIN_WAIT_INTERVAL`].
    pub fn with_wait_interval(mut self, interval: Duration) -> Self {
        self.wait_interval = interval.max(MIN_WAIT_INTERVAL);
        self
    }

    /// Read from an existing queue instead of acquiring a fresh one.
    /// Such an inbox is not released when the worker is dropped.
    pub fn with_inbox_id(mut self, qid: usize) -> Self {
        self.inbox_id = Some(qid);
        self
    }

    /// Acquire the inbox and return a worker that has not been started yet.
    pub fn build<T: WorkerTask>(self, task: T) -> Result<WorkerThread, WorkerError> {
        let inbox = self.manager.acquire(self.inbox_id);
        if let Some(qid) = self.inbox_id {
            if !inbox.is_bound() {
                return Err(WorkerError::InvalidInbox(qid));
            }
        }

        let ctx = WorkerContext {
            nickname: Arc::from(self.nickname),
            inbox,
            manager: self.manager,
            running: Arc::new(AtomicBool::new(false)),
        };
        Ok(WorkerThread::new(
            ctx,
            self.wait_interval,
            Box::new(task),
            self.inbox_id.is_none(),
        ))
    }

    /// Build and start in one step.
    pub fn spawn<T: WorkerTask>(self, task: T) -> Result<WorkerThread, WorkerError> {
        let mut worker = self.build(task)?;
        worker.start()?;
        Ok(worker)
    }
}
