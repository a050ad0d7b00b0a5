//! Scene management for segue.
//!
//! This module provides the scene lifecycle and the transition engine that
//! animates switches between scenes.
//!
//! # Overview
//!
//! Scenes are self-contained units of application state registered with a
//! [`SceneManager`] under unique names. Each tick the manager either:
//! - feeds input to the current scene, then updates and renders it, or
//! - advances the transition in flight and composites its two snapshots.
//!
//! A switch with a transition is a deferred commit: the target scene is
//! entered and snapshotted straight away, but only becomes current (and the
//! outgoing scene only gets `on_exit`) once the transition completes.
//!
//! # Example
//!
//! ```ignore
//! use segue::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = AppConfig::new().title("Scenes").size(800, 600);
//!     let mut manager = SceneManager::new(config.width, config.height)?;
//!
//!     manager.add_scene("menu", Menu::default());
//!     manager.add_scene("game", Game::default());
//!
//!     manager.register_transition("menu", "game", || Transition::fade(1.0));
//!     manager.register_transition("game", "menu", || Transition::slide(0.6));
//!     manager.register_default_transition(|| Transition::circle_wipe(0.8));
//!
//!     manager.run("menu", config)
//! }
//! ```

mod manager;
mod scene;
mod transition;

pub use manager::{ActiveTransition, SceneManager};
pub use scene::Scene;
pub use transition::{Transition, TransitionFactory, TransitionKind};
