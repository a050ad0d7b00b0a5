//! The capability contract every scene implements.

use crate::canvas::Canvas;
use crate::input::InputEvent;

/// A self-contained application state such as a menu or a play area.
///
/// Scenes are registered with a [`SceneManager`](super::SceneManager) under a
/// unique name. The manager owns them for the lifetime of the application and
/// only ever talks to them through this trait.
///
/// # Example
///
/// ```ignore
/// struct Title;
///
/// impl Scene for Title {
///     fn handle_input(&mut self, events: &[InputEvent]) -> Option<String> {
///         key_pressed(events, KeyCode::Space).then(|| "game".to_string())
///     }
///
///     fn update(&mut self, _dt: f32) {}
///
///     fn render(&mut self, target: &mut Canvas) {
///         target.fill(Color::rgb(50, 50, 100));
///     }
/// }
/// ```
pub trait Scene {
    /// Handle this tick's input events.
    ///
    /// Returning `Some(name)` asks the manager to switch to the scene
    /// registered under `name`.
    fn handle_input(&mut self, events: &[InputEvent]) -> Option<String>;

    /// Advance scene logic by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Draw the scene into `target`.
    ///
    /// `target` may be the output surface or an offscreen snapshot buffer;
    /// don't hold on to it between calls.
    fn render(&mut self, target: &mut Canvas);

    /// Called when the scene becomes active, before its first update.
    fn on_enter(&mut self, _surface: &Canvas) {}

    /// Called when the scene stops being the current scene.
    fn on_exit(&mut self) {}
}
