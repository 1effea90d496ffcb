use ash::vk;
use raw_window_handle::HandleError;

use super::{
  initialization::{InstanceCreationError, SurfaceError},
  pipeline::PipelineCreationError,
  renderer::SwapchainRecreationError,
  swapchain::{AcquireNextImageError, SwapchainCreationError},
};

pub fn error_chain_fmt(
  e: &impl std::error::Error,
  f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
  writeln!(f, "{}\nCauses:", e)?;
  let mut current = e.source();
  while let Some(cause) = current {
    writeln!(f, "  {}", cause)?;
    current = cause.source();
  }
  Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum OutOfMemoryError {
  #[error("Out of device memory")]
  OutOfDeviceMemory,
  #[error("Out of host memory")]
  OutOfHostMemory,
}

impl From<vk::Result> for OutOfMemoryError {
  fn from(value: vk::Result) -> Self {
    match value {
      vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => OutOfMemoryError::OutOfDeviceMemory,
      vk::Result::ERROR_OUT_OF_HOST_MEMORY => OutOfMemoryError::OutOfHostMemory,
      _ => {
        panic!("Invalid vk::Result to OutOfMemoryError cast: {:?}", value);
      }
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
  #[error("OS error")]
  OsError(#[source] winit::error::OsError),
  #[error("Event loop error")]
  EventLoopError(#[source] winit::error::EventLoopError),
  #[error("Failed to get handle")]
  HandleError(#[source] HandleError),
}

#[derive(thiserror::Error)]
pub enum InitializationError {
  #[error("Instance creation failed")]
  InstanceCreationFailed(#[source] InstanceCreationError),

  #[error("No physical device supports the application")]
  NoCompatibleDevices,

  #[error("Window error")]
  WindowError(#[source] WindowError),

  #[error("Not enough memory")]
  NotEnoughMemory(#[source] OutOfMemoryError),

  #[error("Surface is lost and no longer available")]
  SurfaceIsLost,

  #[error("Failed to create swapchain")]
  SwapchainCreationFailed(#[source] SwapchainCreationError),

  #[error("Failed to create pipeline")]
  PipelineCreationFailed(#[source] PipelineCreationError),

  // undefined behavior / driver or application bug (see vl)
  #[error("Device is lost")]
  DeviceLost,
  #[error("Unknown")]
  Unknown,
}
impl std::fmt::Debug for InitializationError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    error_chain_fmt(self, f)
  }
}

impl From<InstanceCreationError> for InitializationError {
  fn from(value: InstanceCreationError) -> Self {
    InitializationError::InstanceCreationFailed(value)
  }
}

impl From<winit::error::OsError> for InitializationError {
  fn from(value: winit::error::OsError) -> Self {
    InitializationError::WindowError(WindowError::OsError(value))
  }
}

impl From<winit::error::EventLoopError> for InitializationError {
  fn from(value: winit::error::EventLoopError) -> Self {
    InitializationError::WindowError(WindowError::EventLoopError(value))
  }
}

impl From<HandleError> for InitializationError {
  fn from(value: HandleError) -> Self {
    InitializationError::WindowError(WindowError::HandleError(value))
  }
}

impl From<SurfaceError> for InitializationError {
  fn from(value: SurfaceError) -> Self {
    match value {
      SurfaceError::OutOfMemory(err) => InitializationError::NotEnoughMemory(err),
      SurfaceError::SurfaceIsLost => InitializationError::SurfaceIsLost,
    }
  }
}

impl From<SwapchainCreationError> for InitializationError {
  fn from(value: SwapchainCreationError) -> Self {
    InitializationError::SwapchainCreationFailed(value)
  }
}

impl From<PipelineCreationError> for InitializationError {
  fn from(value: PipelineCreationError) -> Self {
    InitializationError::PipelineCreationFailed(value)
  }
}

impl From<OutOfMemoryError> for InitializationError {
  fn from(value: OutOfMemoryError) -> Self {
    InitializationError::NotEnoughMemory(value)
  }
}

impl From<vk::Result> for InitializationError {
  fn from(value: vk::Result) -> Self {
    match value {
      vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
        InitializationError::NotEnoughMemory(OutOfMemoryError::from(value))
      }
      vk::Result::ERROR_DEVICE_LOST => InitializationError::DeviceLost,
      vk::Result::ERROR_SURFACE_LOST_KHR => InitializationError::SurfaceIsLost,
      // validation layers may say more on this
      vk::Result::ERROR_INITIALIZATION_FAILED => InitializationError::Unknown,
      _ => {
        log::error!("Invalid vk::Result: {:?}", value);
        InitializationError::Unknown
      }
    }
  }
}

#[derive(thiserror::Error)]
pub enum FrameRenderError {
  #[error("Out of memory")]
  OutOfMemory(#[source] OutOfMemoryError),

  #[error("Device is lost")]
  DeviceLost,

  #[error("Failed to acquire swapchain image")]
  FailedToAcquireSwapchainImage(#[source] AcquireNextImageError),

  #[error("Failed to recreate swapchain")]
  FailedToRecreateSwapchain(#[source] SwapchainRecreationError),
}
impl std::fmt::Debug for FrameRenderError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    error_chain_fmt(self, f)
  }
}

impl From<vk::Result> for FrameRenderError {
  fn from(value: vk::Result) -> Self {
    match value {
      vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
        FrameRenderError::OutOfMemory(OutOfMemoryError::from(value))
      }
      vk::Result::ERROR_DEVICE_LOST => FrameRenderError::DeviceLost,
      _ => panic!("Invalid cast from vk::Result to FrameRenderError"),
    }
  }
}

impl From<OutOfMemoryError> for FrameRenderError {
  fn from(value: OutOfMemoryError) -> Self {
    Self::OutOfMemory(value)
  }
}

impl From<AcquireNextImageError> for FrameRenderError {
  fn from(value: AcquireNextImageError) -> Self {
    Self::FailedToAcquireSwapchainImage(value)
  }
}

impl From<SwapchainRecreationError> for FrameRenderError {
  fn from(value: SwapchainRecreationError) -> Self {
    Self::FailedToRecreateSwapchain(value)
  }
}
