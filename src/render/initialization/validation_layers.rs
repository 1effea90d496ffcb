use ash::vk;

use std::{ffi::CStr, os::raw::c_void};

use crate::{
  render::{errors::OutOfMemoryError, VALIDATION_LAYERS},
  utility,
};

// returns the subset of VALIDATION_LAYERS that is available
pub fn get_supported_validation_layers(
  entry: &ash::Entry,
) -> Result<Box<[&'static CStr]>, OutOfMemoryError> {
  log::info!("Checking for validation layers");

  let properties = unsafe { entry.enumerate_instance_layer_properties() }
    .map_err(OutOfMemoryError::from)?;
  let available: Vec<String> = properties
    .iter()
    .filter_map(|props| {
      match unsafe { utility::i8_array_as_cstr(&props.layer_name) } {
        Ok(s) => Some(s.to_str().ok()?.to_owned()),
        Err(_) => {
          log::warn!(
            "There exists an available validation layer with an invalid name that couldn't be decoded"
          );
          None
        }
      }
    })
    .collect();

  log::debug!("System validation layers: {:?}", available);

  let (supported, unavailable): (Vec<&CStr>, Vec<&CStr>) = VALIDATION_LAYERS
    .into_iter()
    .partition(|layer| available.iter().any(|av| av.as_str() == layer.to_str().unwrap()));

  if !unavailable.is_empty() {
    log::error!(
      "Some requested validation layers are not available: {:?}",
      unavailable
    );
  }

  Ok(supported.into_boxed_slice())
}

fn message_type_label(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
  match message_type {
    vk::DebugUtilsMessageTypeFlagsEXT::GENERAL => "[General]",
    vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => "[Performance]",
    vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => "[Validation]",
    vk::DebugUtilsMessageTypeFlagsEXT::DEVICE_ADDRESS_BINDING => "[Address Binding]",
    _ => "[Unknown]",
  }
}

unsafe extern "system" fn vulkan_debug_utils_callback(
  message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
  message_type: vk::DebugUtilsMessageTypeFlagsEXT,
  p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
  _p_user_data: *mut c_void,
) -> vk::Bool32 {
  let message = CStr::from_ptr((*p_callback_data).p_message);
  let message = format!(
    "{} {}",
    message_type_label(message_type),
    message.to_string_lossy()
  );
  match message_severity {
    vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE => log::debug!("{message}"),
    vk::DebugUtilsMessageSeverityFlagsEXT::INFO => log::info!("{message}"),
    vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => log::warn!("{message}"),
    vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => log::error!("{message}"),
    _ => log::warn!("<Unknown severity>: {message}"),
  }

  vk::FALSE
}

pub struct DebugUtils {
  loader: ash::ext::debug_utils::Instance,
  messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugUtils {
  pub fn setup(
    entry: &ash::Entry,
    instance: &ash::Instance,
    create_info: vk::DebugUtilsMessengerCreateInfoEXT,
  ) -> Result<Self, OutOfMemoryError> {
    let loader = ash::ext::debug_utils::Instance::new(entry, instance);

    log::debug!("Creating debug utils messenger");
    let messenger = unsafe {
      loader
        .create_debug_utils_messenger(&create_info, None)
        .map_err(OutOfMemoryError::from)?
    };

    Ok(Self { loader, messenger })
  }

  pub fn get_debug_messenger_create_info<'a>() -> vk::DebugUtilsMessengerCreateInfoEXT<'a> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
      .message_severity(
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
          | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
          | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
          | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
      )
      .message_type(
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
          | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
          | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
      )
      .pfn_user_callback(Some(vulkan_debug_utils_callback))
  }

  pub unsafe fn destroy_self(&self) {
    self
      .loader
      .destroy_debug_utils_messenger(self.messenger, None);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_every_message_category() {
    assert_eq!(
      message_type_label(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL),
      "[General]"
    );
    assert_eq!(
      message_type_label(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION),
      "[Validation]"
    );
    assert_eq!(
      message_type_label(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE),
      "[Performance]"
    );
    assert_eq!(
      message_type_label(vk::DebugUtilsMessageTypeFlagsEXT::DEVICE_ADDRESS_BINDING),
      "[Address Binding]"
    );
    assert_eq!(
      message_type_label(vk::DebugUtilsMessageTypeFlagsEXT::empty()),
      "[Unknown]"
    );
  }
}
