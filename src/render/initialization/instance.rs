use ash::vk;
use raw_window_handle::RawDisplayHandle;
use std::ffi::CStr;

use crate::{
  render::{errors::OutOfMemoryError, TARGET_API_VERSION},
  utility, APPLICATION_NAME, APPLICATION_VERSION,
};

#[derive(thiserror::Error)]
pub enum InstanceCreationError {
  #[error("Out of memory")]
  OutOfMemory(#[source] OutOfMemoryError),

  #[error("Required instance extensions are not available: {0:?}")]
  MissingExtensions(Box<[String]>),

  #[error("A requested layer is not present")]
  LayerNotPresent,

  #[error("The Vulkan implementation's maximum supported version is less than the one targeted by the application")]
  IncompatibleDriver,

  #[error("Instance creation failed because of some other error")]
  GenericInitializationError,
}
impl std::fmt::Debug for InstanceCreationError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    crate::render::errors::error_chain_fmt(self, f)
  }
}

impl From<OutOfMemoryError> for InstanceCreationError {
  fn from(value: OutOfMemoryError) -> Self {
    InstanceCreationError::OutOfMemory(value)
  }
}

impl From<vk::Result> for InstanceCreationError {
  fn from(value: vk::Result) -> Self {
    match value {
      vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
        InstanceCreationError::OutOfMemory(OutOfMemoryError::from(value))
      }
      vk::Result::ERROR_LAYER_NOT_PRESENT => InstanceCreationError::LayerNotPresent,
      vk::Result::ERROR_INCOMPATIBLE_DRIVER => InstanceCreationError::IncompatibleDriver,
      _ => InstanceCreationError::GenericInitializationError,
    }
  }
}

// Checks if all required extensions exist and are supported by the host system
// Returns unavailable extension names as an error
fn check_instance_extension_support(
  entry: &ash::Entry,
  required_extensions: &[&CStr],
) -> Result<(), InstanceCreationError> {
  log::info!(
    "Required instance extensions by the application: {:?}",
    required_extensions
  );

  let available: Vec<String> = unsafe { entry.enumerate_instance_extension_properties(None) }
    .map_err(OutOfMemoryError::from)?
    .iter()
    .filter_map(|props| {
      match unsafe { utility::i8_array_as_cstr(&props.extension_name) } {
        Ok(s) => Some(s.to_str().ok()?.to_owned()),
        Err(_) => {
          log::warn!(
            "There exists an available extension with an invalid name that couldn't be decoded"
          );
          None
        }
      }
    })
    .collect();

  log::debug!("Available instance extensions: {:?}", available);

  let unavailable: Vec<String> = required_extensions
    .iter()
    .filter(|req| !available.iter().any(|av| av.as_str() == req.to_str().unwrap()))
    .map(|req| req.to_string_lossy().into_owned())
    .collect();
  if unavailable.is_empty() {
    Ok(())
  } else {
    Err(InstanceCreationError::MissingExtensions(
      unavailable.into_boxed_slice(),
    ))
  }
}

fn check_target_api_version(entry: &ash::Entry) -> Result<(), InstanceCreationError> {
  let max_supported_version = match unsafe { entry.try_enumerate_instance_version() } {
    // Vulkan 1.1+
    Ok(opt) => match opt {
      Some(version) => version,
      None => vk::API_VERSION_1_0,
    },
    // Vulkan 1.0
    Err(_) => vk::API_VERSION_1_0,
  };

  log::info!(
    "Vulkan library max supported version: {}",
    utility::parse_vulkan_api_version(max_supported_version)
  );

  if max_supported_version < TARGET_API_VERSION {
    return Err(InstanceCreationError::IncompatibleDriver);
  }
  Ok(())
}

fn get_app_info<'a>() -> vk::ApplicationInfo<'a> {
  vk::ApplicationInfo::default()
    .api_version(TARGET_API_VERSION)
    .application_name(APPLICATION_NAME)
    .application_version(APPLICATION_VERSION)
    .engine_version(vk::make_api_version(0, 1, 0, 0))
}

fn get_required_extensions(
  display_handle: RawDisplayHandle,
) -> Result<Vec<&'static CStr>, InstanceCreationError> {
  let mut required_extensions = Vec::new();

  #[cfg(feature = "vl")]
  required_extensions.push(ash::ext::debug_utils::NAME);

  let surface_extensions = ash_window::enumerate_required_extensions(display_handle)
    .map_err(InstanceCreationError::from)?
    .iter()
    .map(|&ptr| unsafe { CStr::from_ptr(ptr) });
  required_extensions.extend(surface_extensions);

  Ok(required_extensions)
}

#[cfg(feature = "vl")]
pub fn create_instance(
  entry: &ash::Entry,
  display_handle: RawDisplayHandle,
) -> Result<(ash::Instance, super::DebugUtils), InstanceCreationError> {
  use std::{ffi::c_void, ptr::addr_of};

  check_target_api_version(entry)?;

  let required_extensions = get_required_extensions(display_handle)?;
  check_instance_extension_support(entry, required_extensions.as_slice())?;
  // required to be alive until the end of instance creation
  let required_extensions_ptr: Vec<*const std::ffi::c_char> = required_extensions
    .iter()
    .map(|v| v.as_ptr())
    .collect();

  let app_info = get_app_info();

  // valid until the end of scope
  let validation_layers = super::get_supported_validation_layers(entry)?;
  let vl_pointers: Vec<*const std::ffi::c_char> =
    validation_layers.iter().map(|name| name.as_ptr()).collect();

  // passed in the instance creation p_next chain so that instance creation and
  // destruction is itself covered by the messenger
  let debug_create_info = super::DebugUtils::get_debug_messenger_create_info();

  let create_info = vk::InstanceCreateInfo {
    s_type: vk::StructureType::INSTANCE_CREATE_INFO,
    p_next: addr_of!(debug_create_info) as *const c_void,
    p_application_info: &app_info,
    pp_enabled_layer_names: vl_pointers.as_ptr(),
    enabled_layer_count: vl_pointers.len() as u32,
    pp_enabled_extension_names: required_extensions_ptr.as_ptr(),
    enabled_extension_count: required_extensions_ptr.len() as u32,
    flags: vk::InstanceCreateFlags::empty(),
    _marker: std::marker::PhantomData,
  };

  log::debug!("Creating instance");
  let instance: ash::Instance = unsafe {
    entry
      .create_instance(&create_info, None)
      .map_err(InstanceCreationError::from)?
  };

  let debug_utils = match super::DebugUtils::setup(entry, &instance, debug_create_info) {
    Ok(v) => v,
    Err(err) => {
      unsafe { instance.destroy_instance(None) };
      return Err(err.into());
    }
  };

  Ok((instance, debug_utils))
}

#[cfg(not(feature = "vl"))]
pub fn create_instance(
  entry: &ash::Entry,
  display_handle: RawDisplayHandle,
) -> Result<ash::Instance, InstanceCreationError> {
  check_target_api_version(entry)?;

  let required_extensions = get_required_extensions(display_handle)?;
  check_instance_extension_support(entry, required_extensions.as_slice())?;
  // required to be alive until the end of instance creation
  let required_extensions_ptr: Vec<*const std::ffi::c_char> = required_extensions
    .iter()
    .map(|v| v.as_ptr())
    .collect();

  let app_info = get_app_info();

  let create_info = vk::InstanceCreateInfo {
    s_type: vk::StructureType::INSTANCE_CREATE_INFO,
    p_next: std::ptr::null(),
    p_application_info: &app_info,
    pp_enabled_layer_names: std::ptr::null(),
    enabled_layer_count: 0,
    pp_enabled_extension_names: required_extensions_ptr.as_ptr(),
    enabled_extension_count: required_extensions_ptr.len() as u32,
    flags: vk::InstanceCreateFlags::empty(),
    _marker: std::marker::PhantomData,
  };

  log::debug!("Creating instance");
  unsafe {
    entry
      .create_instance(&create_info, None)
      .map_err(InstanceCreationError::from)
  }
}
