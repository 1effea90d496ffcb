mod app;
mod render;
mod utility;

use std::ffi::CStr;

use ash::vk;
use winit::{
  event::{Event, WindowEvent},
  event_loop::{ControlFlow, EventLoop},
};

use app::App;
use render::InitializationError;

pub const WINDOW_TITLE: &str = "Glimmer";
pub const INITIAL_WINDOW_WIDTH: u32 = 1280;
pub const INITIAL_WINDOW_HEIGHT: u32 = 720;

pub const APPLICATION_NAME: &CStr = c"Glimmer";
pub const APPLICATION_VERSION: u32 = vk::make_api_version(0, 1, 0, 0);

fn main() {
  env_logger::init();

  if let Err(err) = run() {
    log::error!("Renderer initialization failed: {:?}", err);
    std::process::exit(1);
  }
}

fn run() -> Result<(), InitializationError> {
  let event_loop = EventLoop::new()?;
  let mut app = App::new(&event_loop)?;

  event_loop.run(move |event, target| {
    target.set_control_flow(ControlFlow::Poll);

    match event {
      Event::Resumed => {
        if let Err(err) = app.start(target) {
          log::error!("Failed to start rendering: {:?}", err);
          target.exit();
        }
      }
      Event::WindowEvent { event, .. } => match event {
        WindowEvent::CloseRequested => {
          log::info!("Close requested, exiting");
          target.exit();
        }
        WindowEvent::Resized(new_size) => {
          app.window_resized(new_size);
        }
        WindowEvent::RedrawRequested => {
          if let Err(err) = app.render_frame() {
            log::error!("Failed to render frame: {:?}", err);
            target.exit();
          }
        }
        _ => {}
      },
      Event::AboutToWait => {
        // render continuously
        app.request_redraw();
      }
      _ => {}
    }
  })?;

  Ok(())
}
