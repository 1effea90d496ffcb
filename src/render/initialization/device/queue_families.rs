use std::collections::HashSet;
use std::marker::PhantomData;
use std::ptr;

use ash::vk;

use crate::render::initialization::{Surface, SurfaceError};

#[derive(Debug, Clone, Copy)]
pub struct QueueFamilies {
  pub graphics: u32,
  pub presentation: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum QueueFamilyError {
  #[error("Surface error")]
  SurfaceError(#[source] SurfaceError),
  #[error("Device does not support required queue families")]
  DoesNotSupportRequiredQueueFamilies,
}

impl From<SurfaceError> for QueueFamilyError {
  fn from(value: SurfaceError) -> Self {
    QueueFamilyError::SurfaceError(value)
  }
}

impl QueueFamilies {
  pub fn get_from_physical_device(
    physical_device: vk::PhysicalDevice,
    properties: &[vk::QueueFamilyProperties],
    surface: &Surface,
  ) -> Result<Self, QueueFamilyError> {
    let mut graphics = None;
    let mut presentation = None;
    for (i, props) in properties.iter().enumerate() {
      let i = i as u32;
      let supports_graphics = props.queue_flags.contains(vk::QueueFlags::GRAPHICS);
      let supports_presentation =
        unsafe { surface.supports_queue_family(physical_device, i) }?;

      // a family that supports both avoids concurrent sharing of the swapchain images
      if supports_graphics && supports_presentation {
        return Ok(Self {
          graphics: i,
          presentation: i,
        });
      }
      if supports_graphics && graphics.is_none() {
        graphics = Some(i);
      }
      if supports_presentation && presentation.is_none() {
        presentation = Some(i);
      }
    }

    match (graphics, presentation) {
      (Some(graphics), Some(presentation)) => Ok(Self {
        graphics,
        presentation,
      }),
      _ => Err(QueueFamilyError::DoesNotSupportRequiredQueueFamilies),
    }
  }
}

#[derive(Debug)]
pub struct Queues {
  pub graphics: vk::Queue,
  pub presentation: vk::Queue,
}

impl Queues {
  const QUEUE_PRIORITIES: [f32; 1] = [1.0];

  pub fn get_queue_create_infos<'a>(
    queue_families: &QueueFamilies,
  ) -> Vec<vk::DeviceQueueCreateInfo<'a>> {
    // graphics and presentation may share a family, in which case only one queue
    // can be requested from it
    let unique_families: HashSet<u32> =
      HashSet::from([queue_families.graphics, queue_families.presentation]);

    unique_families
      .into_iter()
      .map(|index| vk::DeviceQueueCreateInfo {
        s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
        p_next: ptr::null(),
        flags: vk::DeviceQueueCreateFlags::empty(),
        queue_family_index: index,
        queue_count: 1,
        p_queue_priorities: Self::QUEUE_PRIORITIES.as_ptr(),
        _marker: PhantomData,
      })
      .collect()
  }

  pub unsafe fn retrieve(device: &ash::Device, queue_families: &QueueFamilies) -> Queues {
    let graphics = device.get_device_queue(queue_families.graphics, 0);
    let presentation = if queue_families.presentation == queue_families.graphics {
      graphics
    } else {
      device.get_device_queue(queue_families.presentation, 0)
    };

    Queues {
      graphics,
      presentation,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shared_family_yields_a_single_create_info() {
    let families = QueueFamilies {
      graphics: 0,
      presentation: 0,
    };
    let infos = Queues::get_queue_create_infos(&families);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].queue_family_index, 0);
    assert_eq!(infos[0].queue_count, 1);
  }

  #[test]
  fn distinct_families_yield_one_create_info_each() {
    let families = QueueFamilies {
      graphics: 0,
      presentation: 2,
    };
    let mut indices: Vec<u32> = Queues::get_queue_create_infos(&families)
      .iter()
      .map(|info| info.queue_family_index)
      .collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 2]);
  }
}
