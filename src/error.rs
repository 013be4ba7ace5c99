use thiserror::Error;

/// Failures surfaced by the fallible packet accessors.
#[derive(Debug, Error)]
pub enum PacketError {
    #[error("packet from '{sender}' carries no payload")]
    Empty { sender: String },
    #[error("malformed serialized payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Lifecycle failures of a worker thread.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker '{0}' is already running")]
    AlreadyRunning(String),
    #[error("worker '{0}' was never started")]
    NotStarted(String),
    #[error("no queue with id {0} to use as inbox")]
    InvalidInbox(usize),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("worker '{0}' panicked")]
    Panicked(String),
}
