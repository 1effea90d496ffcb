use std::ops::Deref;

use ash::vk;

use crate::{
  render::{
    initialization::{Surface, SurfaceError},
    REQUIRED_DEVICE_EXTENSIONS, TARGET_API_VERSION,
  },
  utility,
};

use super::{QueueFamilies, QueueFamilyError};

// Saves additional physical device information in order to not query it multiple times
pub struct PhysicalDevice {
  inner: vk::PhysicalDevice,
  pub queue_families: QueueFamilies,
}

impl Deref for PhysicalDevice {
  type Target = vk::PhysicalDevice;

  fn deref(&self) -> &Self::Target {
    &self.inner
  }
}

impl PhysicalDevice {
  // Applies the suitability predicate to each enumerated device and selects the
  // first one that passes. Returns Ok(None) if no device qualifies.
  pub unsafe fn select(
    instance: &ash::Instance,
    surface: &Surface,
  ) -> Result<Option<PhysicalDevice>, vk::Result> {
    for physical_device in instance.enumerate_physical_devices()? {
      let properties = instance.get_physical_device_properties(physical_device);
      log_device_properties(&properties);

      match check_device_suitability(instance, physical_device, &properties, surface) {
        Ok(Some(queue_families)) => {
          log::info!(
            "Using physical device \"{:?}\"",
            utility::i8_array_as_cstr(&properties.device_name)
              .expect("Physical device name is not a valid CStr"),
          );
          return Ok(Some(PhysicalDevice {
            inner: physical_device,
            queue_families,
          }));
        }
        Ok(None) => {}
        Err(err) => log::error!("Device selection error: {:?}", err),
      }
    }

    Ok(None)
  }
}

fn log_device_properties(properties: &vk::PhysicalDeviceProperties) {
  log::info!(
    "\nFound physical device \"{:?}\":
        API Version: {},
        ID: {},
        Type: {},",
    unsafe { utility::i8_array_as_cstr(&properties.device_name) }
      .map(|name| name.to_string_lossy())
      .unwrap_or(std::borrow::Cow::Borrowed("<invalid name>")),
    utility::parse_vulkan_api_version(properties.api_version),
    properties.device_id,
    match properties.device_type {
      vk::PhysicalDeviceType::INTEGRATED_GPU => "Integrated GPU",
      vk::PhysicalDeviceType::DISCRETE_GPU => "Discrete GPU",
      vk::PhysicalDeviceType::VIRTUAL_GPU => "Virtual GPU",
      vk::PhysicalDeviceType::CPU => "CPU",
      _ => "Unknown",
    },
  );
}

fn supports_required_extensions(
  instance: &ash::Instance,
  physical_device: vk::PhysicalDevice,
) -> Result<bool, vk::Result> {
  let available =
    unsafe { instance.enumerate_device_extension_properties(physical_device) }?;

  Ok(REQUIRED_DEVICE_EXTENSIONS.iter().all(|required| {
    available.iter().any(|props| {
      unsafe { utility::i8_array_as_cstr(&props.extension_name) }
        .is_ok_and(|name| name == *required)
    })
  }))
}

fn supports_swapchain(
  physical_device: vk::PhysicalDevice,
  surface: &Surface,
) -> Result<bool, SurfaceError> {
  let formats = unsafe { surface.get_formats(physical_device) }?;
  let present_modes = unsafe { surface.get_present_modes(physical_device) }?;

  Ok(!formats.is_empty() && !present_modes.is_empty())
}

#[derive(Debug, thiserror::Error)]
enum DeviceSuitabilityError {
  #[error("Surface error")]
  SurfaceError(#[from] SurfaceError),
  #[error("Vulkan error")]
  VkError(#[from] vk::Result),
}

fn check_device_suitability(
  instance: &ash::Instance,
  physical_device: vk::PhysicalDevice,
  properties: &vk::PhysicalDeviceProperties,
  surface: &Surface,
) -> Result<Option<QueueFamilies>, DeviceSuitabilityError> {
  if properties.device_type != vk::PhysicalDeviceType::DISCRETE_GPU {
    log::info!("Skipped physical device: Device is not a discrete GPU");
    return Ok(None);
  }

  if properties.api_version < TARGET_API_VERSION {
    log::info!(
      "Skipped physical device: Device API version is less than targeted by the application"
    );
    return Ok(None);
  }

  if !supports_required_extensions(instance, physical_device)? {
    log::warn!("Skipped physical device: Device does not support the swapchain extension");
    return Ok(None);
  }

  if !supports_swapchain(physical_device, surface)? {
    log::warn!("Skipped physical device: Device does not expose any surface format or present mode");
    return Ok(None);
  }

  let queue_family_properties =
    unsafe { instance.get_physical_device_queue_family_properties(physical_device) };
  log::debug!("Queue family properties: {:#?}", queue_family_properties);

  match QueueFamilies::get_from_physical_device(physical_device, &queue_family_properties, surface)
  {
    Ok(families) => Ok(Some(families)),
    Err(QueueFamilyError::DoesNotSupportRequiredQueueFamilies) => {
      log::info!("Skipped physical device: Device does not contain required queue families");
      Ok(None)
    }
    Err(QueueFamilyError::SurfaceError(err)) => Err(err.into()),
  }
}
