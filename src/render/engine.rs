use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::{
  dpi::PhysicalSize,
  event_loop::{EventLoop, EventLoopWindowTarget},
  window::{Window, WindowBuilder},
};

use crate::{
  render::{
    device_destroyable::destroy,
    errors::{FrameRenderError, InitializationError},
    initialization::{self, Surface},
    renderer::Renderer,
    sync_renderer::SyncRenderer,
  },
  utility::OnErr,
  INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH, WINDOW_TITLE,
};

#[cfg(feature = "vl")]
use crate::render::initialization::DebugUtils;

pub struct RenderEngine {
  entry: ash::Entry,
  instance: ash::Instance,
  #[cfg(feature = "vl")]
  debug_utils: DebugUtils,

  windowed: Option<WindowedRender>,
}

impl RenderEngine {
  pub fn new(event_loop: &EventLoop<()>) -> Result<Self, InitializationError> {
    let entry: ash::Entry = unsafe { initialization::get_entry() };

    let display_handle = event_loop.display_handle()?;

    #[cfg(feature = "vl")]
    let (instance, debug_utils) = initialization::create_instance(&entry, display_handle.as_raw())?;
    #[cfg(not(feature = "vl"))]
    let instance = initialization::create_instance(&entry, display_handle.as_raw())?;

    Ok(Self {
      entry,
      instance,
      #[cfg(feature = "vl")]
      debug_utils,
      windowed: None,
    })
  }

  // creates the window and everything that depends on its surface
  pub fn start(&mut self, target: &EventLoopWindowTarget<()>) -> Result<(), InitializationError> {
    // resumed may be signaled more than once in a window's lifetime
    if self.windowed.is_some() {
      return Ok(());
    }

    self.windowed = Some(WindowedRender::new(target, &self.entry, &self.instance)?);
    Ok(())
  }

  pub fn render_frame(&mut self) -> Result<(), FrameRenderError> {
    match self.windowed.as_mut() {
      Some(windowed) => windowed.render_next_frame(),
      None => Ok(()),
    }
  }

  pub fn window_resized(&mut self, new_size: PhysicalSize<u32>) {
    if let Some(windowed) = self.windowed.as_mut() {
      windowed.window_resized(new_size);
    }
  }

  pub fn request_window_redraw(&self) {
    if let Some(windowed) = self.windowed.as_ref() {
      windowed.window.request_redraw();
    }
  }
}

impl Drop for RenderEngine {
  fn drop(&mut self) {
    log::info!("Destroying renderer");
    unsafe {
      if let Some(windowed) = self.windowed.as_mut() {
        windowed.destroy_self();
      }

      #[cfg(feature = "vl")]
      self.debug_utils.destroy_self();

      destroy!(&self.instance);
    }
  }
}

fn create_window(
  target: &EventLoopWindowTarget<()>,
  initial_size: PhysicalSize<u32>,
) -> Result<Window, winit::error::OsError> {
  WindowBuilder::new()
    .with_title(WINDOW_TITLE)
    .with_inner_size(initial_size)
    .build(target)
}

struct WindowedRender {
  pub window: Window,
  window_size: PhysicalSize<u32>,
  surface: Surface,
  sync: SyncRenderer,
}

impl WindowedRender {
  pub fn new(
    target: &EventLoopWindowTarget<()>,
    entry: &ash::Entry,
    instance: &ash::Instance,
  ) -> Result<Self, InitializationError> {
    let initial_size = PhysicalSize {
      width: INITIAL_WINDOW_WIDTH,
      height: INITIAL_WINDOW_HEIGHT,
    };

    let window = create_window(target, initial_size)?;
    // the window manager may have picked a different size
    let window_size = window.inner_size();

    let surface = Surface::new(
      entry,
      instance,
      target.display_handle()?.as_raw(),
      window.window_handle()?.as_raw(),
    )?;

    let renderer = Renderer::new(instance, &surface, window_size)
      .on_err(|_| unsafe { destroy!(&surface) })?;

    // takes ownership of renderer and destroys it on failure
    let sync = SyncRenderer::new(renderer).on_err(|_| unsafe { destroy!(&surface) })?;

    Ok(Self {
      window,
      window_size,
      surface,
      sync,
    })
  }

  pub fn render_next_frame(&mut self) -> Result<(), FrameRenderError> {
    self.sync.render_next_frame(&self.surface, self.window_size)
  }

  pub fn window_resized(&mut self, new_size: PhysicalSize<u32>) {
    if new_size != self.window_size {
      self.window_size = new_size;
      self.sync.extent_changed();
    }
  }

  pub unsafe fn destroy_self(&mut self) {
    self.sync.destroy_self();
    destroy!(&self.surface);
  }
}
