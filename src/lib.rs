// Module naming follows project convention (Core = packet, Queue = pooled queues, Worker = threads)
#[allow(non_snake_case)]
pub mod Core {
    pub mod packet;
    pub use packet::Packet; // re-export for stable path
}
#[allow(non_snake_case)]
pub mod Queue;
#[allow(non_snake_case)]
pub mod Worker;
#[allow(non_snake_case)]
pub mod Debug {
    pub mod StructDebug;
}

pub mod error;
pub mod ffi;

pub use error::{PacketError, WorkerError};
pub use Core::Packet;
pub use Queue::{QueueHandle, QueueManager, QueueResource};
pub use Worker::{WorkerBuilder, WorkerContext, WorkerTask, WorkerThread};
