use ash::vk;
use winit::dpi::PhysicalSize;

use crate::{
  render::{
    command_pool::GraphicsCommandPool,
    device_destroyable::{destroy, fill_destroyable_array_with_expression},
    errors::{error_chain_fmt, InitializationError, OutOfMemoryError},
    initialization::{
      device::{create_logical_device, PhysicalDevice, Queues},
      Surface, SurfaceError,
    },
    pipeline::{GraphicsPipeline, PipelineCreationError},
    render_pass::create_render_pass,
    swapchain::{self, Swapchain, SwapchainCreationError},
    FRAMES_IN_FLIGHT,
  },
  utility::OnErr,
};

#[derive(thiserror::Error)]
pub enum SwapchainRecreationError {
  #[error("Out of memory")]
  OutOfMemory(#[source] OutOfMemoryError),

  #[error("Surface error")]
  SurfaceError(#[source] SurfaceError),

  #[error("Failed to recreate swapchain")]
  SwapchainCreationFailed(#[source] SwapchainCreationError),

  #[error("Failed to rebuild pipeline")]
  PipelineCreationFailed(#[source] PipelineCreationError),

  #[error("Device is lost")]
  DeviceIsLost,
}
impl std::fmt::Debug for SwapchainRecreationError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    error_chain_fmt(self, f)
  }
}

impl From<vk::Result> for SwapchainRecreationError {
  fn from(value: vk::Result) -> Self {
    match value {
      vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
        SwapchainRecreationError::OutOfMemory(value.into())
      }
      vk::Result::ERROR_DEVICE_LOST => SwapchainRecreationError::DeviceIsLost,
      _ => panic!(
        "Invalid vk::Result to SwapchainRecreationError cast: {:?}",
        value
      ),
    }
  }
}

impl From<OutOfMemoryError> for SwapchainRecreationError {
  fn from(value: OutOfMemoryError) -> Self {
    SwapchainRecreationError::OutOfMemory(value)
  }
}

impl From<SurfaceError> for SwapchainRecreationError {
  fn from(value: SurfaceError) -> Self {
    SwapchainRecreationError::SurfaceError(value)
  }
}

impl From<SwapchainCreationError> for SwapchainRecreationError {
  fn from(value: SwapchainCreationError) -> Self {
    SwapchainRecreationError::SwapchainCreationFailed(value)
  }
}

impl From<PipelineCreationError> for SwapchainRecreationError {
  fn from(value: PipelineCreationError) -> Self {
    SwapchainRecreationError::PipelineCreationFailed(value)
  }
}

pub struct Renderer {
  pub physical_device: PhysicalDevice,
  pub device: ash::Device,
  pub queues: Queues,

  pub swapchain: Swapchain,
  render_pass: vk::RenderPass,
  pipeline: GraphicsPipeline,

  pub graphics_pools: [GraphicsCommandPool; FRAMES_IN_FLIGHT],
}

impl Renderer {
  pub fn new(
    instance: &ash::Instance,
    surface: &Surface,
    window_size: PhysicalSize<u32>,
  ) -> Result<Self, InitializationError> {
    let physical_device = match unsafe { PhysicalDevice::select(instance, surface) }? {
      Some(device) => device,
      None => return Err(InitializationError::NoCompatibleDevices),
    };

    let (device, queues) = create_logical_device(instance, &physical_device)?;

    let image_format = {
      let formats = match unsafe { surface.get_formats(*physical_device) } {
        Ok(v) => v,
        Err(err) => {
          unsafe { destroy!(&device) };
          return Err(err.into());
        }
      };
      swapchain::select_image_format(&formats)
    };

    let render_pass = create_render_pass(&device, image_format.format)
      .on_err(|_| unsafe { destroy!(&device) })?;

    let swapchain = Swapchain::create(
      instance,
      &physical_device,
      &device,
      surface,
      render_pass,
      image_format,
      window_size,
    )
    .on_err(|_| unsafe {
      destroy!(&device => &render_pass);
      destroy!(&device);
    })?;

    let pipeline = GraphicsPipeline::new(&device, render_pass).on_err(|_| unsafe {
      destroy!(&device => &swapchain, &render_pass);
      destroy!(&device);
    })?;

    let graphics_pools = fill_destroyable_array_with_expression!(
      &device,
      GraphicsCommandPool::create(&device, &physical_device.queue_families),
      FRAMES_IN_FLIGHT
    )
    .on_err(|_| unsafe {
      destroy!(&device => &pipeline, &swapchain, &render_pass);
      destroy!(&device);
    })?;

    Ok(Self {
      physical_device,
      device,
      queues,
      swapchain,
      render_pass,
      pipeline,
      graphics_pools,
    })
  }

  // A full recreation episode: waits for the device to become fully idle, tears
  // the old per-surface objects down and rebuilds them against the current
  // surface state. The render pass and pipeline are only rebuilt when the
  // selected surface format changed (viewport and scissor are dynamic, so an
  // extent change alone does not invalidate them).
  pub fn recreate_swapchain(
    &mut self,
    surface: &Surface,
    window_size: PhysicalSize<u32>,
  ) -> Result<(), SwapchainRecreationError> {
    // makes the mutation below mutually exclusive with all in-flight frames
    unsafe { self.device.device_wait_idle() }?;

    let formats = unsafe { surface.get_formats(*self.physical_device) }?;
    let image_format = swapchain::select_image_format(&formats);

    let old_format = self.swapchain.format();
    let format_changed = image_format.format != old_format.format
      || image_format.color_space != old_format.color_space;
    if format_changed {
      log::info!(
        "Surface format changed to {:?}, rebuilding render pass and pipeline",
        image_format
      );
      unsafe {
        destroy!(&self.device => &self.pipeline, &self.render_pass);
      }
      self.render_pass = vk::RenderPass::null();
      self.pipeline = GraphicsPipeline::null();

      self.render_pass = create_render_pass(&self.device, image_format.format)?;
      self.pipeline = GraphicsPipeline::new(&self.device, self.render_pass)?;
    }

    self.swapchain.recreate(
      &self.physical_device,
      &self.device,
      surface,
      self.render_pass,
      image_format,
      window_size,
    )?;

    Ok(())
  }

  pub unsafe fn record_graphics(
    &mut self,
    frame_i: usize,
    image_index: usize,
  ) -> Result<(), OutOfMemoryError> {
    let extent = self.swapchain.extent();
    let framebuffer = self.swapchain.framebuffer(image_index);
    self.graphics_pools[frame_i].record_main(
      &self.device,
      self.render_pass,
      framebuffer,
      extent,
      &self.pipeline,
    )
  }

  pub unsafe fn destroy_self(&self) {
    destroy!(&self.device => &self.graphics_pools as &[GraphicsCommandPool]);
    destroy!(&self.device => &self.swapchain, &self.pipeline, &self.render_pass);
    destroy!(&self.device);
  }
}
