mod builder;
mod task;
mod thread;

pub use builder::{WorkerBuilder, DEFAULT_WAIT_INTERVAL, MIN_WAIT_INTERVAL};
pub use task::{WorkerContext, WorkerTask};
pub use thread::WorkerThread;
