use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// A discrete input event delivered to scenes once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A key went down. Auto-repeat is not reported.
    KeyDown(KeyCode),
    /// A key was released.
    KeyUp(KeyCode),
    /// The user asked to close the application.
    Quit,
}

impl InputEvent {
    /// Translate a winit window event. Returns `None` for events scenes
    /// don't see.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::CloseRequested => Some(InputEvent::Quit),
            WindowEvent::KeyboardInput { event, .. } => {
                Self::from_key(event.physical_key, event.state, event.repeat)
            }
            _ => None,
        }
    }

    /// Translate a raw key transition.
    pub fn from_key(key: PhysicalKey, state: ElementState, repeat: bool) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match state {
            ElementState::Pressed if repeat => None,
            ElementState::Pressed => Some(InputEvent::KeyDown(code)),
            ElementState::Released => Some(InputEvent::KeyUp(code)),
        }
    }
}

/// Returns true if `key` went down in `events`.
pub fn key_pressed(events: &[InputEvent], key: KeyCode) -> bool {
    events.contains(&InputEvent::KeyDown(key))
}

/// Returns true if `events` contains a quit request.
pub fn quit_requested(events: &[InputEvent]) -> bool {
    events.contains(&InputEvent::Quit)
}

/// Tracks which keys are currently held, fed from per-tick events.
#[derive(Debug, Default)]
pub struct KeyState {
    keys_down: HashSet<KeyCode>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one tick's worth of events.
    pub fn apply(&mut self, events: &[InputEvent]) {
        for event in events {
            match *event {
                InputEvent::KeyDown(key) => {
                    self.keys_down.insert(key);
                }
                InputEvent::KeyUp(key) => {
                    self.keys_down.remove(&key);
                }
                InputEvent::Quit => {}
            }
        }
    }

    /// Forget all held keys (e.g. when a scene is re-entered).
    pub fn reset(&mut self) {
        self.keys_down.clear();
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }
}

/// Shared, read-only view of the keys held down across the whole app.
///
/// The [`SceneManager`](crate::SceneManager) feeds it every tick's events,
/// including ticks spent in a transition, so a key pressed while a scene
/// was fading in still reads as held once that scene runs.
#[derive(Clone, Debug, Default)]
pub struct HeldKeys(Rc<RefCell<KeyState>>);

impl HeldKeys {
    pub(crate) fn apply(&self, events: &[InputEvent]) {
        self.0.borrow_mut().apply(events);
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.0.borrow().key_down(key)
    }
}
