use std::sync::Arc;
use std::time::Instant;

use log::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::clock::FrameClock;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::gpu::GpuContext;
use crate::input::{InputEvent, quit_requested};
use crate::present::Presenter;
use crate::scene::SceneManager;

impl SceneManager {
    /// Run this manager in a window. See [`run`].
    pub fn run(self, initial_scene: &str, config: AppConfig) -> Result<(), AppError> {
        run(self, initial_scene, config)
    }
}

/// Activate `initial_scene`, open a window and drive `manager` until quit.
///
/// Each tick collects the input gathered since the previous one, steps the
/// manager with the elapsed time (capped to `config.target_fps`) and
/// presents the output canvas. An unknown initial scene fails before any
/// window opens.
///
/// # Example
/// ```ignore
/// let mut manager = SceneManager::new(800, 600)?;
/// manager.add_scene("menu", Menu::default());
/// segue::run(manager, "menu", AppConfig::new().title("Menu"))?;
/// ```
pub fn run(mut manager: SceneManager, initial_scene: &str, config: AppConfig) -> Result<(), AppError> {
    if let Err(e) = manager.switch_scene(initial_scene) {
        error!("cannot start: {}", e);
        return Err(e.into());
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = SegueApp {
        clock: FrameClock::new(config.target_fps),
        config,
        manager,
        pending_events: Vec::new(),
        running: true,
        error: None,
        window: WindowState::Pending,
    };

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => {
            info!("event loop finished");
            Ok(())
        }
    }
}

enum WindowState {
    Pending,
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        presenter: Presenter,
    },
}

struct SegueApp {
    manager: SceneManager,
    config: AppConfig,
    clock: FrameClock,
    pending_events: Vec<InputEvent>,
    running: bool,
    error: Option<AppError>,
    window: WindowState,
}

impl SegueApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: AppError) {
        error!("{}", e);
        self.error = Some(e);
        event_loop.exit();
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let (width, height) = self.manager.size();
        let window_attrs = WindowAttributes::default()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(width, height))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let presenter = Presenter::new(&gpu, width, height);

        info!("opened {}x{} window '{}'", width, height, self.config.title);
        self.clock = FrameClock::starting_at(self.config.target_fps, Instant::now());
        self.window = WindowState::Running {
            window,
            gpu,
            presenter,
        };
        Ok(())
    }

    /// One tick: step the manager with the collected input, then present.
    fn redraw(&mut self) -> Result<(), AppError> {
        let dt = self.clock.tick();
        let events = std::mem::take(&mut self.pending_events);
        if quit_requested(&events) {
            self.running = false;
        }

        self.manager.tick(dt, &events)?;

        if let WindowState::Running { gpu, presenter, .. } = &mut self.window {
            presenter.present(gpu, self.manager.surface());
        }
        Ok(())
    }
}

impl ApplicationHandler for SegueApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let WindowState::Pending = self.window {
            if let Err(e) = self.open_window(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(input) = InputEvent::from_window_event(&event) {
            self.pending_events.push(input);
        }

        match event {
            WindowEvent::Resized(size) => {
                if let WindowState::Running { gpu, .. } = &mut self.window {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                    return;
                }
                if !self.running {
                    info!("quit requested");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let WindowState::Running { window, .. } = &self.window else {
            return;
        };

        // A pending quit still gets one final tick before exiting.
        if self.clock.is_due(Instant::now()) || !self.running || quit_requested(&self.pending_events) {
            window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.next_deadline()));
    }
}
