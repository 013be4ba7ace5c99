// src/Worker/thread.rs

use super::task::{WorkerContext, WorkerTask};
use crate::error::WorkerError;
use crate::Queue::QueueHandle;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info_span, warn};

/// A named OS thread that drains one inbox queue into a [`WorkerTask`].
///
/// The worker owns its inbox for its whole life. Other threads reach it
/// through [`WorkerThread::inbox`] or [`WorkerThread::send_json`].
/// Dropping the worker stops and joins the thread and, if the inbox was
/// acquired fresh, releases it back to the pool.
pub struct WorkerThread {
    ctx: WorkerContext,
    wait_interval: Duration,
    /// Present while the thread is not running.
    task: Option<Box<dyn WorkerTask>>,
    /// Present while the thread is running; yields the task back on join.
    thread: Option<JoinHandle<Box<dyn WorkerTask>>>,
    owns_inbox: bool,
}

impl WorkerThread {
    pub(crate) fn new(
        ctx: WorkerContext,
        wait_interval: Duration,
        task: Box<dyn WorkerTask>,
        owns_inbox: bool,
    ) -> Self {
        Self {
            ctx,
            wait_interval,
            task: Some(task),
            thread: None,
            owns_inbox,
        }
    }

    /// Spawn the thread and enter the run loop.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        if self.thread.is_some() {
            return Err(WorkerError::AlreadyRunning(self.nickname().to_string()));
        }
        // The task is only missing if a previous run panicked.
        let task = self
            .task
            .take()
            .ok_or_else(|| WorkerError::Panicked(self.nickname().to_string()))?;

        self.ctx.running.store(true, Ordering::Release);
        let ctx = self.ctx.clone();
        let interval = self.wait_interval;
        let spawned = thread::Builder::new()
            .name(self.nickname().to_string())
            .spawn(move || run_loop(ctx, interval, task));

        match spawned {
            Ok(handle) => {
                self.thread = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.ctx.running.store(false, Ordering::Release);
                Err(WorkerError::Spawn(e))
            }
        }
    }

    /// Ask the run loop to exit. Returns immediately; use [`WorkerThread::join`]
    /// to wait for it. The loop notices within one wait interval.
    pub fn stop(&self) {
        self.ctx.stop();
    }

    /// Wait for the thread to finish and take the task back, so the worker
    /// can be started again.
    pub fn join(&mut self) -> Result<(), WorkerError> {
        let handle = self
            .thread
            .take()
            .ok_or_else(|| WorkerError::NotStarted(self.nickname().to_string()))?;

        let joined = handle.join();
        self.ctx.running.store(false, Ordering::Release);
        match joined {
            Ok(task) => {
                self.task = Some(task);
                Ok(())
            }
            Err(_) => Err(WorkerError::Panicked(self.nickname().to_string())),
        }
    }

    /// `stop()` followed by `join()`.
    pub fn shutdown(&mut self) -> Result<(), WorkerError> {
        self.stop();
        self.join()
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn nickname(&self) -> &str {
        self.ctx.nickname()
    }

    /// A handle to this worker's inbox, for other threads to push into.
    pub fn inbox(&self) -> QueueHandle {
        self.ctx.inbox.clone()
    }

    pub fn inbox_id(&self) -> Option<usize> {
        self.ctx.inbox.id()
    }

    /// Push `value` into this worker's inbox, tagged with `sender`.
    pub fn send_json(&self, sender: &str, value: Value) -> bool {
        self.ctx.inbox.push_json(sender, value)
    }

    pub fn context(&self) -> &WorkerContext {
        &self.ctx
    }
}

impl Drop for WorkerThread {
    fn drop(&mut self) {
        if self.thread.is_some() {
            if let Err(e) = self.shutdown() {
                warn!(nickname = self.nickname(), "worker exited abnormally: {}", e);
            }
        }
        if self.owns_inbox {
            self.ctx.manager.release(&self.ctx.inbox);
        }
    }
}

impl std::fmt::Debug for WorkerThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::Debug::StructDebug::debug_worker_thread(self, f)
    }
}

fn run_loop(
    ctx: WorkerContext,
    interval: Duration,
    mut task: Box<dyn WorkerTask>,
) -> Box<dyn WorkerTask> {
    let span = info_span!("worker", nickname = ctx.nickname());
    let _enter = span.enter();
    debug!(qid = ?ctx.inbox.id(), "thread up");

    task.on_start(&ctx);
    while ctx.loop_continue() {
        // A released inbox returns from wait at once; pace the loop instead.
        if !ctx.inbox.wait(Some(interval)) && !ctx.inbox.is_enabled() {
            thread::sleep(interval);
        }
        while let Some(mut packet) = ctx.inbox.pop() {
            task.on_packet(&ctx, &mut packet);
            if !ctx.loop_continue() {
                break;
            }
        }
        task.on_tick(&ctx);
    }
    task.on_stop(&ctx);

    debug!("thread down");
    task
}
