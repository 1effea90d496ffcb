use std::{marker::PhantomData, ptr};

use ash::vk;

use crate::render::{
  device_destroyable::DeviceManuallyDestroyed, errors::OutOfMemoryError,
  initialization::device::QueueFamilies, pipeline::GraphicsPipeline, BACKGROUND_COLOR,
};

fn create_command_pool(
  device: &ash::Device,
  flags: vk::CommandPoolCreateFlags,
  queue_family_index: u32,
) -> Result<vk::CommandPool, vk::Result> {
  let command_pool_create_info = vk::CommandPoolCreateInfo {
    s_type: vk::StructureType::COMMAND_POOL_CREATE_INFO,
    p_next: ptr::null(),
    flags,
    queue_family_index,
    _marker: PhantomData,
  };
  log::debug!("Creating command pool");
  unsafe { device.create_command_pool(&command_pool_create_info, None) }
}

fn allocate_primary_command_buffers(
  device: &ash::Device,
  command_pool: vk::CommandPool,
  command_buffer_count: u32,
) -> Result<Vec<vk::CommandBuffer>, vk::Result> {
  let allocate_info = vk::CommandBufferAllocateInfo {
    s_type: vk::StructureType::COMMAND_BUFFER_ALLOCATE_INFO,
    p_next: ptr::null(),
    command_buffer_count,
    command_pool,
    level: vk::CommandBufferLevel::PRIMARY,
    _marker: PhantomData,
  };

  log::debug!("Allocating command buffers");
  unsafe { device.allocate_command_buffers(&allocate_info) }
}

// one pool with one primary buffer per in-flight frame slot
pub struct GraphicsCommandPool {
  pool: vk::CommandPool,
  pub main: vk::CommandBuffer,
}

impl GraphicsCommandPool {
  pub fn create(
    device: &ash::Device,
    queue_families: &QueueFamilies,
  ) -> Result<Self, OutOfMemoryError> {
    let flags = vk::CommandPoolCreateFlags::TRANSIENT;
    let pool = create_command_pool(device, flags, queue_families.graphics)
      .map_err(OutOfMemoryError::from)?;

    let main = match allocate_primary_command_buffers(device, pool, 1) {
      Ok(buffers) => buffers[0],
      Err(err) => {
        unsafe { device.destroy_command_pool(pool, None) };
        return Err(err.into());
      }
    };

    Ok(Self { pool, main })
  }

  // may only be called once this slot's fence has signaled
  pub unsafe fn reset(&mut self, device: &ash::Device) -> Result<(), OutOfMemoryError> {
    device
      .reset_command_pool(self.pool, vk::CommandPoolResetFlags::empty())
      .map_err(OutOfMemoryError::from)
  }

  pub unsafe fn record_main(
    &mut self,
    device: &ash::Device,
    render_pass: vk::RenderPass,
    framebuffer: vk::Framebuffer,
    extent: vk::Extent2D,
    pipeline: &GraphicsPipeline,
  ) -> Result<(), OutOfMemoryError> {
    let cb = self.main;
    let begin_info =
      vk::CommandBufferBeginInfo::default().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
    device.begin_command_buffer(cb, &begin_info)?;

    {
      let clear_value = vk::ClearValue {
        color: BACKGROUND_COLOR,
      };
      let render_pass_begin_info = vk::RenderPassBeginInfo {
        s_type: vk::StructureType::RENDER_PASS_BEGIN_INFO,
        p_next: ptr::null(),
        render_pass,
        framebuffer,
        // whole image
        render_area: vk::Rect2D {
          offset: vk::Offset2D { x: 0, y: 0 },
          extent,
        },
        clear_value_count: 1,
        p_clear_values: &clear_value,
        _marker: PhantomData,
      };
      device.cmd_begin_render_pass(cb, &render_pass_begin_info, vk::SubpassContents::INLINE);

      device.cmd_bind_pipeline(cb, vk::PipelineBindPoint::GRAPHICS, pipeline.pipeline);

      // viewport and scissor are dynamic pipeline states
      let viewport = vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
      };
      let scissor = vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent,
      };
      device.cmd_set_viewport(cb, 0, &[viewport]);
      device.cmd_set_scissor(cb, 0, &[scissor]);

      device.cmd_draw(cb, 3, 1, 0, 0);

      device.cmd_end_render_pass(cb);
    }

    device.end_command_buffer(cb)?;

    Ok(())
  }
}

impl DeviceManuallyDestroyed for GraphicsCommandPool {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_command_pool(self.pool, None);
  }
}
