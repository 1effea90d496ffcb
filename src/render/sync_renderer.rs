use std::{marker::PhantomData, ptr};

use ash::vk;
use winit::dpi::PhysicalSize;

use crate::render::{
  device_destroyable::{fill_destroyable_array_with_expression, DeviceManuallyDestroyed},
  errors::{FrameRenderError, InitializationError},
  frame::Frame,
  initialization::Surface,
  renderer::Renderer,
  swapchain::AcquireNextImageError,
  FRAMES_IN_FLIGHT,
};

#[inline]
const fn next_frame_index(current: usize) -> usize {
  (current + 1) % FRAMES_IN_FLIGHT
}

// Drives the per-frame synchronization state machine on top of Renderer:
// wait for the slot fence, acquire, record, submit, present, advance.
pub struct SyncRenderer {
  pub renderer: Renderer,
  frames: [Frame; FRAMES_IN_FLIGHT],
  last_frame_i: usize,

  // set by resize notifications and stale presentation results; consumed at the
  // start of the next frame so that at most one recreation runs per frame
  recreate_swapchain_next_frame: bool,
}

impl SyncRenderer {
  pub fn new(renderer: Renderer) -> Result<Self, InitializationError> {
    let frames = {
      let device = &renderer.device;
      match fill_destroyable_array_with_expression!(device, Frame::new(device), FRAMES_IN_FLIGHT) {
        Ok(frames) => frames,
        Err(err) => {
          unsafe { renderer.destroy_self() };
          return Err(err.into());
        }
      }
    };

    Ok(Self {
      renderer,
      frames,
      last_frame_i: FRAMES_IN_FLIGHT - 1,
      recreate_swapchain_next_frame: false,
    })
  }

  pub fn extent_changed(&mut self) {
    self.recreate_swapchain_next_frame = true;
  }

  pub fn render_next_frame(
    &mut self,
    surface: &Surface,
    window_size: PhysicalSize<u32>,
  ) -> Result<(), FrameRenderError> {
    // the counter advances regardless of this frame's outcome
    let cur_frame_i = next_frame_index(self.last_frame_i);
    self.last_frame_i = cur_frame_i;
    let frame = &self.frames[cur_frame_i];

    // sole blocking point: the GPU may still own this slot's command buffer
    frame.wait_finished(&self.renderer.device)?;

    if self.recreate_swapchain_next_frame {
      // a zero-area window cannot back a swapchain; recreation stays pending
      // until a nonzero size is observed again
      if window_size.width == 0 || window_size.height == 0 {
        return Ok(());
      }
      self.renderer.recreate_swapchain(surface, window_size)?;
      self.recreate_swapchain_next_frame = false;
    }

    let image_index = match unsafe {
      self
        .renderer
        .swapchain
        .acquire_next_image(frame.image_available)
    } {
      Ok((image_index, suboptimal)) => {
        if suboptimal {
          // still presentable, finish the frame and recreate afterwards
          self.recreate_swapchain_next_frame = true;
        }
        image_index
      }
      Err(AcquireNextImageError::OutOfDate) => {
        log::warn!("Failed to acquire swapchain image: Swapchain is out of date");
        self.recreate_swapchain_next_frame = true;
        // abort without submitting; the slot fence was not reset and stays
        // signaled, so the next use of this slot cannot deadlock
        return Ok(());
      }
      Err(err) => return Err(err.into()),
    };

    unsafe {
      self.renderer.graphics_pools[cur_frame_i].reset(&self.renderer.device)?;
      self
        .renderer
        .record_graphics(cur_frame_i, image_index as usize)?;
    }

    // only unsignal the fence once it is certain that work gets submitted
    frame.reset_finished(&self.renderer.device)?;

    let wait_semaphores = [frame.image_available];
    // work before the color attachment output stage does not need to wait for
    // the acquired image
    let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
    let signal_semaphores = [frame.render_finished];
    let command_buffers = [self.renderer.graphics_pools[cur_frame_i].main];
    let submit_info = vk::SubmitInfo {
      s_type: vk::StructureType::SUBMIT_INFO,
      p_next: ptr::null(),
      wait_semaphore_count: wait_semaphores.len() as u32,
      p_wait_semaphores: wait_semaphores.as_ptr(),
      p_wait_dst_stage_mask: wait_stages.as_ptr(),
      command_buffer_count: command_buffers.len() as u32,
      p_command_buffers: command_buffers.as_ptr(),
      signal_semaphore_count: signal_semaphores.len() as u32,
      p_signal_semaphores: signal_semaphores.as_ptr(),
      _marker: PhantomData,
    };
    unsafe {
      self.renderer.device.queue_submit(
        self.renderer.queues.graphics,
        &[submit_info],
        frame.finished,
      )?;
    }

    match unsafe {
      self.renderer.swapchain.queue_present(
        image_index,
        self.renderer.queues.presentation,
        &[frame.render_finished],
      )
    } {
      Ok(suboptimal) => {
        if suboptimal {
          self.recreate_swapchain_next_frame = true;
        }
      }
      Err(AcquireNextImageError::OutOfDate) => {
        // window changes can happen at any point in this function; errors of
        // this type still signal sync objects accordingly
        log::warn!("Failed to present to swapchain: Swapchain is out of date");
        self.recreate_swapchain_next_frame = true;
      }
      Err(err) => return Err(err.into()),
    }

    Ok(())
  }

  pub unsafe fn destroy_self(&mut self) {
    self
      .renderer
      .device
      .device_wait_idle()
      .expect("Failed to wait for device idleness while destroying resources");

    for frame in self.frames.iter() {
      frame.destroy_self(&self.renderer.device);
    }

    self.renderer.destroy_self();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frame_indices_cycle_through_the_two_slot_ring() {
    // the first rendered frame uses slot 0
    let mut current = FRAMES_IN_FLIGHT - 1;
    let mut observed = Vec::new();
    for _ in 0..5 {
      current = next_frame_index(current);
      observed.push(current);
    }
    assert_eq!(observed, vec![0, 1, 0, 1, 0]);
  }

  #[test]
  fn frame_index_stays_in_bounds() {
    let mut current = 0;
    for _ in 0..100 {
      current = next_frame_index(current);
      assert!(current < FRAMES_IN_FLIGHT);
    }
  }
}
