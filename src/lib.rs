//! # Segue
//!
//! **Named scenes and animated transitions between them.**
//!
//! Register scenes with a [`SceneManager`], map scene pairs to transition
//! factories, and let the manager fade, slide or wipe from one scene to the
//! next. Scenes draw into a CPU [`Canvas`]; the finished frame is presented
//! through wgpu.
//!
//! ## Quick Start
//!
//! ```no_run
//! use segue::*;
//!
//! struct Title;
//!
//! impl Scene for Title {
//!     fn handle_input(&mut self, events: &[InputEvent]) -> Option<String> {
//!         key_pressed(events, KeyCode::Space).then(|| "play".to_string())
//!     }
//!
//!     fn update(&mut self, _dt: f32) {}
//!
//!     fn render(&mut self, target: &mut Canvas) {
//!         target.fill(Color::rgb(50, 50, 100));
//!     }
//! }
//!
//! struct Play;
//!
//! impl Scene for Play {
//!     fn handle_input(&mut self, _events: &[InputEvent]) -> Option<String> {
//!         None
//!     }
//!
//!     fn update(&mut self, _dt: f32) {}
//!
//!     fn render(&mut self, target: &mut Canvas) {
//!         target.fill(Color::rgb(100, 150, 50));
//!     }
//! }
//!
//! fn main() -> Result<(), AppError> {
//!     let mut manager = SceneManager::new(800, 600)?;
//!     manager.add_scene("title", Title);
//!     manager.add_scene("play", Play);
//!     manager.register_transition("title", "play", || Transition::fade(1.0));
//!
//!     manager.run("title", AppConfig::new().title("Quick Start"))
//! }
//! ```

mod app;
mod canvas;
mod clock;
mod config;
mod error;
mod gpu;
mod input;
mod present;
pub mod scene;
mod text;

pub use app::run;
pub use canvas::{BlendMode, Canvas, Color};
pub use clock::FrameClock;
pub use config::AppConfig;
pub use error::{AppError, ConfigError, FontError, SceneError, TransitionError};
pub use gpu::GpuContext;
pub use input::{HeldKeys, InputEvent, KeyState, key_pressed, quit_requested};
pub use present::Presenter;
pub use scene::{
    ActiveTransition, Scene, SceneManager, Transition, TransitionFactory, TransitionKind,
};
pub use text::TextPainter;

// Re-export math and key types
pub use glam::Vec2;
pub use winit::keyboard::KeyCode;
