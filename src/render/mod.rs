mod command_pool;
mod create_objs;
mod device_destroyable;
mod engine;
mod errors;
mod frame;
mod initialization;
mod pipeline;
mod render_pass;
mod renderer;
mod shader;
mod swapchain;
mod sync_renderer;

use std::ffi::CStr;

use ash::vk;

const TARGET_API_VERSION: u32 = vk::API_VERSION_1_3;

const REQUIRED_DEVICE_EXTENSIONS: [&CStr; 1] = [ash::khr::swapchain::NAME];

// two frames get worked on at the same time, one being recorded by the CPU
// while the other executes on the GPU
const FRAMES_IN_FLIGHT: usize = 2;

// lowest latency non-tearing mode, FIFO is used when unavailable
const PREFERRED_PRESENT_MODE: vk::PresentModeKHR = vk::PresentModeKHR::MAILBOX;

// opaque black
const BACKGROUND_COLOR: vk::ClearColorValue = vk::ClearColorValue {
  float32: [0.0, 0.0, 0.0, 1.0],
};

#[cfg(feature = "vl")]
pub const VALIDATION_LAYERS: [&CStr; 1] = [c"VK_LAYER_KHRONOS_validation"];

pub use engine::RenderEngine;
pub use errors::{FrameRenderError, InitializationError};
