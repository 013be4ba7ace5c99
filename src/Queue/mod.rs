mod handle;
pub mod manager;

pub use handle::QueueHandle;
pub use manager::QueueManager;

pub mod Resource {
    pub mod Resource;
    pub mod Resource_impl;
    pub use Resource::QueueResource; // re-export for stable path
}

pub use Resource::QueueResource;
