use std::{marker::PhantomData, ptr};

use ash::vk;

use crate::render::errors::OutOfMemoryError;

pub fn create_render_pass(
  device: &ash::Device,
  format: vk::Format,
) -> Result<vk::RenderPass, OutOfMemoryError> {
  let color_attachment = [vk::AttachmentDescription {
    flags: vk::AttachmentDescriptionFlags::empty(),
    format,
    samples: vk::SampleCountFlags::TYPE_1,
    load_op: vk::AttachmentLoadOp::CLEAR,
    store_op: vk::AttachmentStoreOp::STORE,
    stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
    stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
    initial_layout: vk::ImageLayout::UNDEFINED,
    final_layout: vk::ImageLayout::PRESENT_SRC_KHR, // presentable after the pass finishes
  }];

  let attachment_ref = [vk::AttachmentReference {
    attachment: 0,
    layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
  }];

  let subpass = [vk::SubpassDescription::default()
    .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
    .color_attachments(&attachment_ref)];

  // defer color attachment writes until the acquired image stops being read by
  // the presentation engine (the acquire semaphore wait targets the same stage)
  let dependencies = [vk::SubpassDependency {
    src_subpass: vk::SUBPASS_EXTERNAL,
    dst_subpass: 0,
    src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
    dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
    src_access_mask: vk::AccessFlags::empty(),
    dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
    dependency_flags: vk::DependencyFlags::empty(),
  }];

  let create_info = vk::RenderPassCreateInfo::default()
    .attachments(&color_attachment)
    .subpasses(&subpass)
    .dependencies(&dependencies);
  unsafe {
    device
      .create_render_pass(&create_info, None)
      .map_err(|err| err.into())
  }
}

pub fn create_framebuffer(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  image_view: vk::ImageView,
  extent: vk::Extent2D,
) -> Result<vk::Framebuffer, OutOfMemoryError> {
  let create_info = vk::FramebufferCreateInfo {
    s_type: vk::StructureType::FRAMEBUFFER_CREATE_INFO,
    p_next: ptr::null(),
    flags: vk::FramebufferCreateFlags::empty(),
    render_pass,
    attachment_count: 1,
    p_attachments: &image_view,
    width: extent.width,
    height: extent.height,
    layers: 1,
    _marker: PhantomData,
  };
  unsafe {
    device
      .create_framebuffer(&create_info, None)
      .map_err(|err| err.into())
  }
}
