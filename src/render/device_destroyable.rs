use ash::vk;

pub trait ManuallyDestroyed {
  unsafe fn destroy_self(&self);
}
pub trait DeviceManuallyDestroyed {
  unsafe fn destroy_self(&self, device: &ash::Device);
}

impl<T: ManuallyDestroyed> DeviceManuallyDestroyed for T {
  unsafe fn destroy_self(&self, _device: &ash::Device) {
    self.destroy_self();
  }
}

macro_rules! destroy {
  ($($obj:expr),+) => {
    {
      use crate::render::device_destroyable::ManuallyDestroyed;
      $(ManuallyDestroyed::destroy_self($obj);)+
    }
  };

  ($device:expr => $($obj:expr),+) => {
    {
      use crate::render::device_destroyable::DeviceManuallyDestroyed;
      $(DeviceManuallyDestroyed::destroy_self($obj, $device);)+
    }
  };
}
pub(crate) use destroy;

// fill_destroyable_array_with_expression!(device, <exp>, 2) transforms into [<exp>, <exp>]
// If any <exp> returns an error, all previous <exp> results get destroyed with
// DeviceManuallyDestroyed::destroy_self() and the error is returned
macro_rules! fill_destroyable_array_with_expression {
  ($device:expr, $ex:expr, $arr_size:expr) => {{
    use crate::render::device_destroyable::DeviceManuallyDestroyed;
    use std::mem::MaybeUninit;

    let device: &ash::Device = $device;
    let mut tmp: [MaybeUninit<_>; $arr_size] = unsafe { MaybeUninit::uninit().assume_init() };
    let mut macro_res = Ok(());
    for i in 0..$arr_size {
      let exp_result: Result<_, _> = $ex;
      tmp[i] = match exp_result {
        Ok(v) => MaybeUninit::new(v),
        Err(err) => {
          for j in 0..i {
            unsafe {
              DeviceManuallyDestroyed::destroy_self(tmp[j].assume_init_ref(), device);
            }
          }
          macro_res = Err(err);
          break;
        }
      };
    }
    macro_res.map(|_| unsafe { std::mem::transmute::<_, [_; $arr_size]>(tmp) })
  }};
}
pub(crate) use fill_destroyable_array_with_expression;

impl<T: DeviceManuallyDestroyed> DeviceManuallyDestroyed for Box<[T]> {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    for value in self.iter() {
      value.destroy_self(device);
    }
  }
}

impl<T: DeviceManuallyDestroyed> DeviceManuallyDestroyed for [T] {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    for value in self.iter() {
      value.destroy_self(device);
    }
  }
}

impl ManuallyDestroyed for ash::Instance {
  unsafe fn destroy_self(&self) {
    self.destroy_instance(None);
  }
}

impl ManuallyDestroyed for ash::Device {
  unsafe fn destroy_self(&self) {
    self.destroy_device(None);
  }
}

impl DeviceManuallyDestroyed for vk::Fence {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_fence(*self, None);
  }
}

impl DeviceManuallyDestroyed for vk::Semaphore {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_semaphore(*self, None);
  }
}

impl DeviceManuallyDestroyed for vk::RenderPass {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_render_pass(*self, None);
  }
}

impl DeviceManuallyDestroyed for vk::ImageView {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_image_view(*self, None);
  }
}

impl DeviceManuallyDestroyed for vk::Framebuffer {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_framebuffer(*self, None);
  }
}

impl DeviceManuallyDestroyed for vk::PipelineLayout {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_pipeline_layout(*self, None);
  }
}

impl DeviceManuallyDestroyed for vk::ShaderModule {
  unsafe fn destroy_self(&self, device: &ash::Device) {
    device.destroy_shader_module(*self, None);
  }
}
