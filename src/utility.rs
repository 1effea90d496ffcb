use std::ffi::{CStr, FromBytesUntilNulError};

use ash::vk;

// this module contains general functions used in other modules

pub fn parse_vulkan_api_version(v: u32) -> String {
  format!(
    "{}.{}.{}",
    vk::api_version_major(v),
    vk::api_version_minor(v),
    vk::api_version_patch(v)
  )
}

pub unsafe fn i8_array_as_cstr(arr: &[i8]) -> Result<&CStr, FromBytesUntilNulError> {
  CStr::from_bytes_until_nul(std::mem::transmute::<&[i8], &[u8]>(arr))
}

pub trait OnErr<T, E> {
  fn on_err<O: FnOnce(&E)>(self, op: O) -> Result<T, E>
  where
    Self: Sized;
}

impl<T, E> OnErr<T, E> for Result<T, E> {
  fn on_err<O: FnOnce(&E)>(self, op: O) -> Result<T, E>
  where
    Self: Sized,
  {
    if let Err(ref e) = self {
      op(e);
    }
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_packed_api_versions() {
    assert_eq!(parse_vulkan_api_version(vk::API_VERSION_1_3), "1.3.0");
    assert_eq!(
      parse_vulkan_api_version(vk::make_api_version(0, 1, 2, 162)),
      "1.2.162"
    );
  }

  #[test]
  fn decodes_nul_terminated_i8_arrays() {
    let mut arr = [0i8; 8];
    for (i, b) in b"abc\0".iter().enumerate() {
      arr[i] = *b as i8;
    }
    let cstr = unsafe { i8_array_as_cstr(&arr) }.unwrap();
    assert_eq!(cstr.to_str().unwrap(), "abc");
  }
}
