mod logical_device;
mod physical_device;
mod queue_families;

pub use logical_device::create_logical_device;
pub use physical_device::PhysicalDevice;
pub use queue_families::{QueueFamilies, QueueFamilyError, Queues};
