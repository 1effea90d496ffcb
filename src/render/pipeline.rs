use std::{marker::PhantomData, ptr};

use ash::vk;

use crate::render::{
  device_destroyable::DeviceManuallyDestroyed,
  errors::OutOfMemoryError,
  shader::{Shader, ShaderError},
};

#[derive(Debug, thiserror::Error)]
pub enum PipelineCreationError {
  #[error("Out of memory")]
  OutOfMemory(#[source] OutOfMemoryError),
  #[error("Failed to load shader")]
  ShaderFailed(#[source] ShaderError),
  #[error("Failed to compile or link shaders")]
  CompilationFailed,
}

impl From<OutOfMemoryError> for PipelineCreationError {
  fn from(value: OutOfMemoryError) -> Self {
    PipelineCreationError::OutOfMemory(value)
  }
}

pub struct GraphicsPipeline {
  pub layout: vk::PipelineLayout,
  pub pipeline: vk::Pipeline,
}

impl GraphicsPipeline {
  pub fn new(
    device: &ash::Device,
    render_pass: vk::RenderPass,
  ) -> Result<Self, PipelineCreationError> {
    let layout = Self::create_layout(device)?;

    let shader = match Shader::load(device) {
      Ok(v) => v,
      Err(err) => {
        unsafe { layout.destroy_self(device) };
        return Err(PipelineCreationError::ShaderFailed(err));
      }
    };

    let pipeline_result = Self::create_pipeline(device, layout, &shader, render_pass);
    // modules can be released as soon as the pipeline exists
    unsafe { shader.destroy_self(device) };

    match pipeline_result {
      Ok(pipeline) => Ok(Self { layout, pipeline }),
      Err(err) => {
        unsafe { layout.destroy_self(device) };
        Err(err)
      }
    }
  }

  // used to mark the pipeline as unusable when a recreation episode fails partway
  pub fn null() -> Self {
    Self {
      layout: vk::PipelineLayout::null(),
      pipeline: vk::Pipeline::null(),
    }
  }

  fn create_layout(device: &ash::Device) -> Result<vk::PipelineLayout, OutOfMemoryError> {
    // no descriptor sets and no push constants
    let layout_create_info = vk::PipelineLayoutCreateInfo {
      s_type: vk::StructureType::PIPELINE_LAYOUT_CREATE_INFO,
      p_next: ptr::null(),
      flags: vk::PipelineLayoutCreateFlags::empty(),
      set_layout_count: 0,
      p_set_layouts: ptr::null(),
      push_constant_range_count: 0,
      p_push_constant_ranges: ptr::null(),
      _marker: PhantomData,
    };
    unsafe { device.create_pipeline_layout(&layout_create_info, None) }
      .map_err(OutOfMemoryError::from)
  }

  fn create_pipeline(
    device: &ash::Device,
    layout: vk::PipelineLayout,
    shader: &Shader,
    render_pass: vk::RenderPass,
  ) -> Result<vk::Pipeline, PipelineCreationError> {
    let shader_stages = shader.get_pipeline_shader_creation_info();

    // vertices are generated in the vertex shader
    let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default();

    let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo {
      s_type: vk::StructureType::PIPELINE_INPUT_ASSEMBLY_STATE_CREATE_INFO,
      p_next: ptr::null(),
      flags: vk::PipelineInputAssemblyStateCreateFlags::empty(),
      primitive_restart_enable: vk::FALSE,
      topology: vk::PrimitiveTopology::TRIANGLE_LIST,
      _marker: PhantomData,
    };

    // viewport and scissor values are dynamic and recorded per command buffer,
    // so the pipeline survives extent-only swapchain recreations
    let viewport_state = vk::PipelineViewportStateCreateInfo {
      s_type: vk::StructureType::PIPELINE_VIEWPORT_STATE_CREATE_INFO,
      p_next: ptr::null(),
      flags: vk::PipelineViewportStateCreateFlags::empty(),
      viewport_count: 1,
      p_viewports: ptr::null(),
      scissor_count: 1,
      p_scissors: ptr::null(),
      _marker: PhantomData,
    };

    let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
    let dynamic_state = vk::PipelineDynamicStateCreateInfo {
      s_type: vk::StructureType::PIPELINE_DYNAMIC_STATE_CREATE_INFO,
      p_next: ptr::null(),
      flags: vk::PipelineDynamicStateCreateFlags::empty(),
      dynamic_state_count: dynamic_states.len() as u32,
      p_dynamic_states: dynamic_states.as_ptr(),
      _marker: PhantomData,
    };

    let rasterization_state = vk::PipelineRasterizationStateCreateInfo {
      s_type: vk::StructureType::PIPELINE_RASTERIZATION_STATE_CREATE_INFO,
      p_next: ptr::null(),
      flags: vk::PipelineRasterizationStateCreateFlags::empty(),
      depth_clamp_enable: vk::FALSE,
      cull_mode: vk::CullModeFlags::BACK,
      front_face: vk::FrontFace::CLOCKWISE,
      line_width: 1.0,
      polygon_mode: vk::PolygonMode::FILL,
      rasterizer_discard_enable: vk::FALSE,
      depth_bias_clamp: 0.0,
      depth_bias_constant_factor: 0.0,
      depth_bias_enable: vk::FALSE,
      depth_bias_slope_factor: 0.0,
      _marker: PhantomData,
    };

    let multisample_state = vk::PipelineMultisampleStateCreateInfo {
      s_type: vk::StructureType::PIPELINE_MULTISAMPLE_STATE_CREATE_INFO,
      p_next: ptr::null(),
      flags: vk::PipelineMultisampleStateCreateFlags::empty(),
      rasterization_samples: vk::SampleCountFlags::TYPE_1,
      sample_shading_enable: vk::FALSE,
      min_sample_shading: 0.0,
      p_sample_mask: ptr::null(),
      alpha_to_one_enable: vk::FALSE,
      alpha_to_coverage_enable: vk::FALSE,
      _marker: PhantomData,
    };

    let attachment_state = vk::PipelineColorBlendAttachmentState {
      blend_enable: vk::FALSE,
      color_write_mask: vk::ColorComponentFlags::RGBA,
      src_color_blend_factor: vk::BlendFactor::ONE,
      dst_color_blend_factor: vk::BlendFactor::ZERO,
      color_blend_op: vk::BlendOp::ADD,
      src_alpha_blend_factor: vk::BlendFactor::ONE,
      dst_alpha_blend_factor: vk::BlendFactor::ZERO,
      alpha_blend_op: vk::BlendOp::ADD,
    };
    let color_blend_state = vk::PipelineColorBlendStateCreateInfo {
      s_type: vk::StructureType::PIPELINE_COLOR_BLEND_STATE_CREATE_INFO,
      p_next: ptr::null(),
      flags: vk::PipelineColorBlendStateCreateFlags::empty(),
      logic_op_enable: vk::FALSE,
      logic_op: vk::LogicOp::COPY, // disabled
      attachment_count: 1,
      p_attachments: &attachment_state,
      blend_constants: [0.0, 0.0, 0.0, 0.0],
      _marker: PhantomData,
    };

    let create_info = vk::GraphicsPipelineCreateInfo {
      s_type: vk::StructureType::GRAPHICS_PIPELINE_CREATE_INFO,
      p_next: ptr::null(),
      flags: vk::PipelineCreateFlags::empty(),
      stage_count: shader_stages.len() as u32,
      p_stages: shader_stages.as_ptr(),
      p_vertex_input_state: &vertex_input_state,
      p_input_assembly_state: &input_assembly_state,
      p_tessellation_state: ptr::null(),
      p_viewport_state: &viewport_state,
      p_rasterization_state: &rasterization_state,
      p_multisample_state: &multisample_state,
      p_depth_stencil_state: ptr::null(),
      p_color_blend_state: &color_blend_state,
      p_dynamic_state: &dynamic_state,
      layout,
      render_pass,
      subpass: 0,
      base_pipeline_handle: vk::Pipeline::null(),
      base_pipeline_index: -1, // -1 for null
      _marker: PhantomData,
    };
    Ok(unsafe {
      device
        .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None)
        .map_err(|incomplete| incomplete.1)
        .map_err(|vkerr| match vkerr {
          vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            PipelineCreationError::from(OutOfMemoryError::from(vkerr))
          }
          vk::Result::ERROR_INVALID_SHADER_NV => PipelineCreationError::CompilationFailed,
          _ => panic!("Invalid vk::Result from pipeline creation: {:?}", vkerr),
        })?[0]
    })
  }
}

impl DeviceManuallyDestroyed for GraphicsPipeline {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_pipeline(self.pipeline, None);
    device.destroy_pipeline_layout(self.layout, None);
  }
}
