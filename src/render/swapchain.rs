use std::{marker::PhantomData, ptr};

use ash::vk;
use winit::dpi::PhysicalSize;

use crate::{
  render::{
    create_objs::create_image_view,
    device_destroyable::DeviceManuallyDestroyed,
    errors::{error_chain_fmt, OutOfMemoryError},
    initialization::{device::PhysicalDevice, Surface, SurfaceError},
    render_pass::create_framebuffer,
    PREFERRED_PRESENT_MODE,
  },
  utility::OnErr,
};

#[derive(thiserror::Error)]
pub enum SwapchainCreationError {
  #[error("Out of memory")]
  OutOfMemory(#[source] OutOfMemoryError),

  #[error("Device is lost")]
  DeviceIsLost,
  #[error("Surface is lost and no longer available")]
  SurfaceIsLost,
  #[error("Creation failed because of some other error")]
  GenericInitializationError,
}
impl std::fmt::Debug for SwapchainCreationError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    error_chain_fmt(self, f)
  }
}

impl From<vk::Result> for SwapchainCreationError {
  fn from(value: vk::Result) -> Self {
    match value {
      vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
        SwapchainCreationError::OutOfMemory(value.into())
      }
      vk::Result::ERROR_DEVICE_LOST => SwapchainCreationError::DeviceIsLost,
      vk::Result::ERROR_SURFACE_LOST_KHR => SwapchainCreationError::SurfaceIsLost,
      vk::Result::ERROR_INITIALIZATION_FAILED => SwapchainCreationError::GenericInitializationError,

      vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR => {
        panic!("Swapchain creation returned VK_ERROR_NATIVE_WINDOW_IN_USE_KHR")
      }
      _ => panic!("Invalid vk::Result to SwapchainCreationError cast: {:?}", value),
    }
  }
}

impl From<OutOfMemoryError> for SwapchainCreationError {
  fn from(value: OutOfMemoryError) -> Self {
    SwapchainCreationError::OutOfMemory(value)
  }
}

impl From<SurfaceError> for SwapchainCreationError {
  fn from(value: SurfaceError) -> Self {
    match value {
      SurfaceError::OutOfMemory(err) => SwapchainCreationError::OutOfMemory(err),
      SurfaceError::SurfaceIsLost => SwapchainCreationError::SurfaceIsLost,
    }
  }
}

#[derive(thiserror::Error)]
pub enum AcquireNextImageError {
  #[error("Swapchain is out of date and needs to be recreated")]
  OutOfDate,

  #[error("Out of memory")]
  OutOfMemory(#[source] OutOfMemoryError),

  #[error("Device is lost")]
  DeviceIsLost,
  #[error("Surface is lost and no longer available")]
  SurfaceIsLost,
}
impl std::fmt::Debug for AcquireNextImageError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    error_chain_fmt(self, f)
  }
}

impl From<vk::Result> for AcquireNextImageError {
  fn from(value: vk::Result) -> Self {
    match value {
      vk::Result::ERROR_OUT_OF_DATE_KHR => AcquireNextImageError::OutOfDate,
      vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
        AcquireNextImageError::OutOfMemory(value.into())
      }
      vk::Result::ERROR_DEVICE_LOST => AcquireNextImageError::DeviceIsLost,
      vk::Result::ERROR_SURFACE_LOST_KHR => AcquireNextImageError::SurfaceIsLost,
      _ => panic!("Invalid vk::Result to AcquireNextImageError cast: {:?}", value),
    }
  }
}

pub struct Swapchain {
  loader: ash::khr::swapchain::Device,
  inner: vk::SwapchainKHR,
  format: vk::SurfaceFormatKHR,
  extent: vk::Extent2D,
  // parallel arrays, one view and framebuffer per swapchain image
  // the images themselves are owned by the presentation engine
  image_views: Box<[vk::ImageView]>,
  framebuffers: Box<[vk::Framebuffer]>,
}

impl Swapchain {
  pub fn create(
    instance: &ash::Instance,
    physical_device: &PhysicalDevice,
    device: &ash::Device,
    surface: &Surface,
    render_pass: vk::RenderPass,
    image_format: vk::SurfaceFormatKHR,
    window_size: PhysicalSize<u32>,
  ) -> Result<Self, SwapchainCreationError> {
    let loader = ash::khr::swapchain::Device::new(instance, device);

    let mut swapchain = Self {
      loader,
      inner: vk::SwapchainKHR::null(),
      format: image_format,
      extent: vk::Extent2D::default(),
      image_views: Box::new([]),
      framebuffers: Box::new([]),
    };
    swapchain.create_inner(physical_device, device, surface, render_pass, window_size)?;
    Ok(swapchain)
  }

  // Full recreation: destroys framebuffers, views and the chain, then reruns the
  // capability query and rebuilds everything. A device idle wait must have
  // happened before calling this. On error the swapchain is left empty and can
  // still be safely destroyed.
  pub fn recreate(
    &mut self,
    physical_device: &PhysicalDevice,
    device: &ash::Device,
    surface: &Surface,
    render_pass: vk::RenderPass,
    image_format: vk::SurfaceFormatKHR,
    window_size: PhysicalSize<u32>,
  ) -> Result<(), SwapchainCreationError> {
    unsafe {
      self.destroy_self(device);
    }
    self.inner = vk::SwapchainKHR::null();
    self.image_views = Box::new([]);
    self.framebuffers = Box::new([]);

    self.format = image_format;
    self.create_inner(physical_device, device, surface, render_pass, window_size)
  }

  fn create_inner(
    &mut self,
    physical_device: &PhysicalDevice,
    device: &ash::Device,
    surface: &Surface,
    render_pass: vk::RenderPass,
    window_size: PhysicalSize<u32>,
  ) -> Result<(), SwapchainCreationError> {
    let capabilities = unsafe { surface.get_capabilities(**physical_device) }?;
    let present_modes = unsafe { surface.get_present_modes(**physical_device) }?;
    let present_mode = select_present_mode(&present_modes);
    let extent = compute_extent(&capabilities, window_size);
    let image_count = select_image_count(&capabilities);

    log::info!(
      "Creating swapchain with ({}, {}) extent, {:?} format and {:?} present mode",
      extent.width,
      extent.height,
      self.format,
      present_mode
    );

    let queue_families = &physical_device.queue_families;
    let family_indices = [queue_families.graphics, queue_families.presentation];

    let mut create_info = vk::SwapchainCreateInfoKHR {
      s_type: vk::StructureType::SWAPCHAIN_CREATE_INFO_KHR,
      p_next: ptr::null(),
      flags: vk::SwapchainCreateFlagsKHR::empty(),
      surface: **surface,

      min_image_count: image_count,
      image_color_space: self.format.color_space,
      image_format: self.format.format,
      image_extent: extent,
      image_array_layers: 1,
      image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,

      image_sharing_mode: vk::SharingMode::EXCLUSIVE,
      // ignored when SharingMode is EXCLUSIVE
      p_queue_family_indices: ptr::null(),
      queue_family_index_count: 0,

      pre_transform: capabilities.current_transform,
      composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
      present_mode,
      clipped: vk::TRUE,
      old_swapchain: vk::SwapchainKHR::null(),
      _marker: PhantomData,
    };

    // in the rare case that presentation != graphics, set sharing mode to CONCURRENT
    // with both families (concurrent sharing has a performance cost)
    if queue_families.graphics != queue_families.presentation {
      create_info.image_sharing_mode = vk::SharingMode::CONCURRENT;
      create_info.p_queue_family_indices = family_indices.as_ptr();
      create_info.queue_family_index_count = family_indices.len() as u32;
    }

    let swapchain = unsafe { self.loader.create_swapchain(&create_info, None) }?;

    let images = unsafe { self.loader.get_swapchain_images(swapchain) }
      .map_err(OutOfMemoryError::from)
      .on_err(|_| unsafe { self.loader.destroy_swapchain(swapchain, None) })?;
    log::debug!("Swapchain contains {} images", images.len());

    let image_views = {
      let mut image_views: Vec<vk::ImageView> = Vec::with_capacity(images.len());
      for &image in images.iter() {
        match create_image_view(device, image, self.format.format) {
          Ok(view) => image_views.push(view),
          Err(err) => unsafe {
            image_views.destroy_self(device);
            self.loader.destroy_swapchain(swapchain, None);
            return Err(err.into());
          },
        }
      }
      image_views.into_boxed_slice()
    };

    let framebuffers = {
      let mut framebuffers: Vec<vk::Framebuffer> = Vec::with_capacity(image_views.len());
      for &view in image_views.iter() {
        match create_framebuffer(device, render_pass, view, extent) {
          Ok(framebuffer) => framebuffers.push(framebuffer),
          Err(err) => unsafe {
            framebuffers.destroy_self(device);
            image_views.destroy_self(device);
            self.loader.destroy_swapchain(swapchain, None);
            return Err(err.into());
          },
        }
      }
      framebuffers.into_boxed_slice()
    };

    self.inner = swapchain;
    self.extent = extent;
    self.image_views = image_views;
    self.framebuffers = framebuffers;
    Ok(())
  }

  pub unsafe fn acquire_next_image(
    &self,
    semaphore: vk::Semaphore,
  ) -> Result<(u32, bool), AcquireNextImageError> {
    self
      .loader
      .acquire_next_image(self.inner, u64::MAX, semaphore, vk::Fence::null())
      .map_err(AcquireNextImageError::from)
  }

  pub unsafe fn queue_present(
    &self,
    image_index: u32,
    present_queue: vk::Queue,
    wait_semaphores: &[vk::Semaphore],
  ) -> Result<bool, AcquireNextImageError> {
    let present_info = vk::PresentInfoKHR {
      s_type: vk::StructureType::PRESENT_INFO_KHR,
      p_next: ptr::null(),
      wait_semaphore_count: wait_semaphores.len() as u32,
      p_wait_semaphores: wait_semaphores.as_ptr(),
      swapchain_count: 1,
      p_swapchains: &self.inner,
      p_image_indices: &image_index,
      p_results: ptr::null_mut(),
      _marker: PhantomData,
    };

    self
      .loader
      .queue_present(present_queue, &present_info)
      .map_err(AcquireNextImageError::from)
  }

  pub fn format(&self) -> vk::SurfaceFormatKHR {
    self.format
  }

  pub fn extent(&self) -> vk::Extent2D {
    self.extent
  }

  pub fn framebuffer(&self, image_index: usize) -> vk::Framebuffer {
    self.framebuffers[image_index]
  }
}

impl DeviceManuallyDestroyed for Swapchain {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    // framebuffers and views depend on the chain and go first
    self.framebuffers.destroy_self(device);
    self.image_views.destroy_self(device);
    self.loader.destroy_swapchain(self.inner, None);
  }
}

pub fn select_image_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
  for available_format in formats.iter() {
    // commonly available
    if available_format.format == vk::Format::B8G8R8A8_SRGB
      && available_format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
    {
      return *available_format;
    }
  }

  formats[0]
}

fn select_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
  if present_modes.contains(&PREFERRED_PRESENT_MODE) {
    return PREFERRED_PRESENT_MODE;
  }

  // required to be available
  vk::PresentModeKHR::FIFO
}

// the current extent is authoritative unless it holds the "match the window"
// sentinel, in which case the window size is clamped to the allowed range
fn compute_extent(
  capabilities: &vk::SurfaceCapabilitiesKHR,
  size: PhysicalSize<u32>,
) -> vk::Extent2D {
  if capabilities.current_extent.width != u32::MAX {
    return capabilities.current_extent;
  }
  vk::Extent2D {
    width: size.width.clamp(
      capabilities.min_image_extent.width,
      capabilities.max_image_extent.width,
    ),
    height: size.height.clamp(
      capabilities.min_image_extent.height,
      capabilities.max_image_extent.height,
    ),
  }
}

// one more than the minimum, as long as the capabilities allow it
// (max_image_count == 0 means no upper bound)
fn select_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
  if capabilities.max_image_count > 0 {
    (capabilities.min_image_count + 1).min(capabilities.max_image_count)
  } else {
    capabilities.min_image_count + 1
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PREFERRED_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_SRGB,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
  };
  const OTHER_FORMAT: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
    format: vk::Format::R8G8B8A8_UNORM,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
  };

  fn capabilities_with_sentinel_extent() -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
      min_image_count: 2,
      max_image_count: 0,
      current_extent: vk::Extent2D {
        width: u32::MAX,
        height: u32::MAX,
      },
      min_image_extent: vk::Extent2D {
        width: 100,
        height: 100,
      },
      max_image_extent: vk::Extent2D {
        width: 4096,
        height: 4096,
      },
      ..Default::default()
    }
  }

  #[test]
  fn selects_the_preferred_format_when_available() {
    let formats = [OTHER_FORMAT, PREFERRED_FORMAT];
    let selected = select_image_format(&formats);
    assert_eq!(selected.format, PREFERRED_FORMAT.format);
    assert_eq!(selected.color_space, PREFERRED_FORMAT.color_space);
  }

  #[test]
  fn falls_back_to_the_first_listed_format() {
    let formats = [OTHER_FORMAT];
    let selected = select_image_format(&formats);
    assert_eq!(selected.format, OTHER_FORMAT.format);
    assert_eq!(selected.color_space, OTHER_FORMAT.color_space);
  }

  #[test]
  fn selects_mailbox_when_available() {
    let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX];
    assert_eq!(select_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
  }

  #[test]
  fn falls_back_to_fifo() {
    let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
    assert_eq!(select_present_mode(&modes), vk::PresentModeKHR::FIFO);
  }

  #[test]
  fn sentinel_extent_clamps_the_window_size() {
    let capabilities = capabilities_with_sentinel_extent();

    let in_range = compute_extent(&capabilities, PhysicalSize::new(1280, 720));
    assert_eq!((in_range.width, in_range.height), (1280, 720));

    let too_small = compute_extent(&capabilities, PhysicalSize::new(1, 1));
    assert_eq!((too_small.width, too_small.height), (100, 100));

    let too_big = compute_extent(&capabilities, PhysicalSize::new(10000, 10000));
    assert_eq!((too_big.width, too_big.height), (4096, 4096));
  }

  #[test]
  fn fixed_extent_ignores_the_window_size() {
    let capabilities = vk::SurfaceCapabilitiesKHR {
      current_extent: vk::Extent2D {
        width: 640,
        height: 480,
      },
      ..capabilities_with_sentinel_extent()
    };
    let extent = compute_extent(&capabilities, PhysicalSize::new(1280, 720));
    assert_eq!((extent.width, extent.height), (640, 480));
  }

  #[test]
  fn image_count_is_min_plus_one_within_bounds() {
    let unbounded = capabilities_with_sentinel_extent();
    assert_eq!(select_image_count(&unbounded), 3);

    let capped = vk::SurfaceCapabilitiesKHR {
      min_image_count: 2,
      max_image_count: 2,
      ..capabilities_with_sentinel_extent()
    };
    assert_eq!(select_image_count(&capped), 2);
  }
}
