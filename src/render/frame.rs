use ash::vk;

use crate::render::{
  create_objs::{create_fence, create_semaphore},
  device_destroyable::{destroy, DeviceManuallyDestroyed},
  errors::OutOfMemoryError,
};

// synchronization objects for one in-flight frame slot
pub struct Frame {
  pub image_available: vk::Semaphore,
  pub render_finished: vk::Semaphore,
  pub finished: vk::Fence,
}

impl Frame {
  pub fn new(device: &ash::Device) -> Result<Self, OutOfMemoryError> {
    let image_available = create_semaphore(device)?;
    let render_finished = match create_semaphore(device) {
      Ok(v) => v,
      Err(err) => {
        unsafe { destroy!(device => &image_available) };
        return Err(err);
      }
    };
    // signaled so that the first wait on this slot does not block
    let finished = match create_fence(device, vk::FenceCreateFlags::SIGNALED) {
      Ok(v) => v,
      Err(err) => {
        unsafe { destroy!(device => &render_finished, &image_available) };
        return Err(err);
      }
    };

    Ok(Self {
      image_available,
      render_finished,
      finished,
    })
  }

  // blocks until the GPU is done with this slot's previous submission
  // the fence is deliberately not reset here, see SyncRenderer::render_next_frame
  pub fn wait_finished(&self, device: &ash::Device) -> Result<(), vk::Result> {
    unsafe { device.wait_for_fences(&[self.finished], true, u64::MAX) }
  }

  pub fn reset_finished(&self, device: &ash::Device) -> Result<(), vk::Result> {
    unsafe { device.reset_fences(&[self.finished]) }
  }
}

impl DeviceManuallyDestroyed for Frame {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    destroy!(device => &self.image_available, &self.render_finished, &self.finished);
  }
}
