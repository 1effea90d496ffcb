pub mod device;
mod entry;
mod instance;
mod surface;

#[cfg(feature = "vl")]
mod validation_layers;

pub use entry::get_entry;
pub use instance::{create_instance, InstanceCreationError};
pub use surface::{Surface, SurfaceError};
#[cfg(feature = "vl")]
pub use validation_layers::{get_supported_validation_layers, DebugUtils};
