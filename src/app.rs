use winit::{
  dpi::PhysicalSize,
  event_loop::{EventLoop, EventLoopWindowTarget},
};

use crate::render::{FrameRenderError, InitializationError, RenderEngine};

pub struct App {
  render: RenderEngine,
  minimized: bool,
}

impl App {
  pub fn new(event_loop: &EventLoop<()>) -> Result<Self, InitializationError> {
    Ok(Self {
      render: RenderEngine::new(event_loop)?,
      minimized: false,
    })
  }

  pub fn start(&mut self, target: &EventLoopWindowTarget<()>) -> Result<(), InitializationError> {
    self.render.start(target)
  }

  pub fn render_frame(&mut self) -> Result<(), FrameRenderError> {
    if self.minimized {
      return Ok(());
    }
    self.render.render_frame()
  }

  pub fn window_resized(&mut self, new_size: PhysicalSize<u32>) {
    // a zero-area size means the window got minimized; rendering and swapchain
    // recreation stay suspended until it is restored
    self.minimized = new_size.width == 0 || new_size.height == 0;
    if !self.minimized {
      self.render.window_resized(new_size);
    }
  }

  pub fn request_redraw(&self) {
    if !self.minimized {
      self.render.request_window_redraw();
    }
  }
}
