use ash::vk;

use crate::render::errors::OutOfMemoryError;

pub fn create_semaphore(device: &ash::Device) -> Result<vk::Semaphore, OutOfMemoryError> {
  let create_info = vk::SemaphoreCreateInfo::default();
  unsafe { device.create_semaphore(&create_info, None) }.map_err(|err| err.into())
}

pub fn create_fence(
  device: &ash::Device,
  flags: vk::FenceCreateFlags,
) -> Result<vk::Fence, OutOfMemoryError> {
  let create_info = vk::FenceCreateInfo::default().flags(flags);
  unsafe { device.create_fence(&create_info, None) }.map_err(|err| err.into())
}

pub fn create_image_view(
  device: &ash::Device,
  image: vk::Image,
  format: vk::Format,
) -> Result<vk::ImageView, OutOfMemoryError> {
  let create_info = vk::ImageViewCreateInfo::default()
    .image(image)
    .view_type(vk::ImageViewType::TYPE_2D)
    .format(format)
    .components(vk::ComponentMapping {
      r: vk::ComponentSwizzle::IDENTITY,
      g: vk::ComponentSwizzle::IDENTITY,
      b: vk::ComponentSwizzle::IDENTITY,
      a: vk::ComponentSwizzle::IDENTITY,
    })
    .subresource_range(vk::ImageSubresourceRange {
      aspect_mask: vk::ImageAspectFlags::COLOR,
      base_mip_level: 0,
      level_count: 1,
      base_array_layer: 0,
      layer_count: 1,
    });

  unsafe {
    device
      .create_image_view(&create_info, None)
      .map_err(|err| err.into())
  }
}
