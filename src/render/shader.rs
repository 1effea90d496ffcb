use std::{
  ffi::CStr,
  fs::File,
  io::{self},
  marker::PhantomData,
  path::Path,
  ptr,
};

use ash::vk;

use crate::render::{device_destroyable::DeviceManuallyDestroyed, errors::OutOfMemoryError};

const VERT_SHADER_PATH: &str = "./shaders/vert.spv";
const FRAG_SHADER_PATH: &str = "./shaders/frag.spv";

static MAIN_FN_NAME: &CStr = c"main";

#[derive(thiserror::Error, Debug)]
pub enum ShaderError {
  #[error("\"{1}\" IO error")]
  IOError(#[source] io::Error, String),

  #[error("Failed to compile or link")]
  Invalid,

  #[error("Not enough memory")]
  NotEnoughMemory(#[source] OutOfMemoryError),
}

pub struct Shader {
  pub vert: vk::ShaderModule,
  pub frag: vk::ShaderModule,
}

impl Shader {
  pub fn load(device: &ash::Device) -> Result<Self, ShaderError> {
    let vert = load_shader(device, Path::new(VERT_SHADER_PATH))?;
    let frag = match load_shader(device, Path::new(FRAG_SHADER_PATH)) {
      Ok(v) => v,
      Err(err) => {
        unsafe { vert.destroy_self(device) };
        return Err(err);
      }
    };
    Ok(Self { vert, frag })
  }

  pub fn get_pipeline_shader_creation_info(&self) -> [vk::PipelineShaderStageCreateInfo; 2] {
    [
      vk::PipelineShaderStageCreateInfo {
        // Vertex shader
        s_type: vk::StructureType::PIPELINE_SHADER_STAGE_CREATE_INFO,
        p_next: ptr::null(),
        flags: vk::PipelineShaderStageCreateFlags::empty(),
        module: self.vert,
        p_name: MAIN_FN_NAME.as_ptr(),
        p_specialization_info: ptr::null(),
        stage: vk::ShaderStageFlags::VERTEX,
        _marker: PhantomData,
      },
      vk::PipelineShaderStageCreateInfo {
        // Fragment shader
        s_type: vk::StructureType::PIPELINE_SHADER_STAGE_CREATE_INFO,
        p_next: ptr::null(),
        flags: vk::PipelineShaderStageCreateFlags::empty(),
        module: self.frag,
        p_name: MAIN_FN_NAME.as_ptr(),
        p_specialization_info: ptr::null(),
        stage: vk::ShaderStageFlags::FRAGMENT,
        _marker: PhantomData,
      },
    ]
  }
}

impl DeviceManuallyDestroyed for Shader {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_shader_module(self.vert, None);
    device.destroy_shader_module(self.frag, None);
  }
}

fn load_shader(device: &ash::Device, shader_path: &Path) -> Result<vk::ShaderModule, ShaderError> {
  let code = read_shader_code(shader_path)
    .map_err(|err| ShaderError::IOError(err, format!("{:?}", shader_path)))?;
  create_shader_module(device, &code)
}

fn read_shader_code(shader_path: &Path) -> io::Result<Vec<u32>> {
  let mut file = File::open(shader_path)?;
  ash::util::read_spv(&mut file)
}

fn create_shader_module(
  device: &ash::Device,
  code: &[u32],
) -> Result<vk::ShaderModule, ShaderError> {
  let create_info = vk::ShaderModuleCreateInfo::default().code(code);

  unsafe { device.create_shader_module(&create_info, None) }.map_err(|vkerr| match vkerr {
    vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
      ShaderError::NotEnoughMemory(vkerr.into())
    }
    vk::Result::ERROR_INVALID_SHADER_NV => ShaderError::Invalid,
    _ => panic!("Invalid vk::Result from create_shader_module: {:?}", vkerr),
  })
}
