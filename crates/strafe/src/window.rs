//! Window management via winit.
//!
//! Implements [`winit::application::ApplicationHandler`] to drive the event
//! loop. On the first `resumed` it creates the window, the GPU canvas, and
//! the [`Game`]; afterwards it forwards keyboard and close events and runs
//! one game frame per redraw until the game quits.

use std::fmt;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::assets::AssetError;
use crate::config::GameConfig;
use crate::game::{FrameEvent, Game};
use crate::render::{GpuCanvas, RenderError};

/// Why the game could not start, or stopped abnormally.
#[derive(Debug)]
pub enum RunError {
    Render(RenderError),
    Asset(AssetError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Render(e) => write!(f, "{e}"),
            RunError::Asset(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Render(e) => Some(e),
            RunError::Asset(e) => Some(e),
        }
    }
}

impl From<RenderError> for RunError {
    fn from(e: RenderError) -> Self {
        RunError::Render(e)
    }
}

impl From<AssetError> for RunError {
    fn from(e: AssetError) -> Self {
        RunError::Asset(e)
    }
}

/// Everything that only exists once the window is up.
struct Running {
    window: Arc<Window>,
    canvas: GpuCanvas,
    game: Game,
}

/// The application state that winit drives.
struct WinitApp {
    config: GameConfig,
    running: Option<Running>,
    error: Option<RunError>,
}

impl WinitApp {
    fn new(config: GameConfig) -> Self {
        Self {
            config,
            running: None,
            error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running, RunError> {
        let attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width as f64,
                self.config.height as f64,
            ))
            .with_resizable(false);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| RenderError::Window(e.to_string()))?,
        );

        let mut canvas = GpuCanvas::new(window.clone(), self.config.width, self.config.height)?;
        let game = Game::load(&self.config, &mut canvas)?;
        log::info!("{} started", self.config.title);
        Ok(Running {
            window,
            canvas,
            game,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.error.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested");
                running.game.handle_event(FrameEvent::Quit);
            }

            WindowEvent::Resized(size) => running.canvas.resize(size.width, size.height),

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed if !event.repeat => {
                            running.game.handle_event(FrameEvent::KeyDown(key))
                        }
                        ElementState::Pressed => {}
                        ElementState::Released => running.game.handle_event(FrameEvent::KeyUp(key)),
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = running.game.frame(&mut running.canvas) {
                    self.fail(event_loop, e.into());
                    return;
                }
                running.window.request_redraw();
            }

            _ => {}
        }

        if !running.game.is_running() {
            event_loop.exit();
        }
    }
}

/// Open the window and run until the game quits.
pub fn run(config: GameConfig) -> Result<(), RunError> {
    let event_loop = EventLoop::new().map_err(|e| RenderError::EventLoop(e.to_string()))?;
    let mut app = WinitApp::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| RenderError::EventLoop(e.to_string()))?;
    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
