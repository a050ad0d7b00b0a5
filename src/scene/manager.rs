//! Scene manager: registry, transition lookup and the per-tick state machine.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use super::scene::Scene;
use super::transition::{Transition, TransitionFactory};
use crate::canvas::Canvas;
use crate::error::SceneError;
use crate::input::{HeldKeys, InputEvent};

/// A transition in flight together with its two scene snapshots.
pub struct ActiveTransition {
    /// Scene that becomes current once the transition completes.
    pub target: String,
    /// The effect being played.
    pub transition: Transition,
    old_frame: Canvas,
    new_frame: Canvas,
}

impl ActiveTransition {
    /// Snapshot of the outgoing scene.
    pub fn old_frame(&self) -> &Canvas {
        &self.old_frame
    }

    /// Snapshot of the incoming scene.
    pub fn new_frame(&self) -> &Canvas {
        &self.new_frame
    }
}

/// Whether the manager is running a scene or playing a transition.
enum SceneState {
    Idle,
    Transitioning(Box<ActiveTransition>),
}

/// Manages registered scenes and the transitions between them.
///
/// The manager is responsible for:
/// - Owning every registered scene
/// - Picking a transition for each (from, to) switch
/// - Deferring the current-scene change until the transition completes
/// - Producing the output frame each tick
///
/// # Example
///
/// ```ignore
/// let mut manager = SceneManager::new(800, 600)?;
/// manager.add_scene("menu", MainMenu::new());
/// manager.add_scene("game", Game::new());
/// manager.register_transition("menu", "game", || Transition::fade(1.0));
/// manager.register_default_transition(|| Transition::slide(0.5));
/// manager.run("menu", AppConfig::default())?;
/// ```
pub struct SceneManager {
    /// All registered scenes by name.
    scenes: HashMap<String, Box<dyn Scene>>,

    /// Transition factories keyed by (from, to).
    transitions: HashMap<(String, String), TransitionFactory>,

    /// Used when no pair-specific factory is registered.
    default_transition: Option<TransitionFactory>,

    /// Name of the current scene.
    current: Option<String>,

    state: SceneState,

    /// The frame presented to the display.
    surface: Canvas,

    /// Held keys, fed from every tick's events.
    keys: HeldKeys,
}

impl SceneManager {
    /// Create a manager whose output surface is `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, SceneError> {
        Ok(Self {
            scenes: HashMap::new(),
            transitions: HashMap::new(),
            default_transition: None,
            current: None,
            state: SceneState::Idle,
            surface: Canvas::new(width, height)?,
            keys: HeldKeys::default(),
        })
    }

    /// Register a scene. Re-using a name replaces the previous scene without
    /// calling any of its lifecycle hooks.
    pub fn add_scene(&mut self, name: impl Into<String>, scene: impl Scene + 'static) {
        let name = name.into();
        debug!("registering scene '{}'", name);
        self.scenes.insert(name, Box::new(scene));
    }

    /// Use `factory` whenever switching from `from` to `to`.
    pub fn register_transition<F>(&mut self, from: impl Into<String>, to: impl Into<String>, factory: F)
    where
        F: Fn() -> Transition + 'static,
    {
        self.transitions
            .insert((from.into(), to.into()), Rc::new(factory));
    }

    /// Use `factory` for any switch without a pair-specific transition.
    pub fn register_default_transition<F>(&mut self, factory: F)
    where
        F: Fn() -> Transition + 'static,
    {
        self.default_transition = Some(Rc::new(factory));
    }

    /// Factory for switching `from` → `to`: the exact pair first, then the default.
    pub fn transition_for(&self, from: &str, to: &str) -> Option<TransitionFactory> {
        self.transitions
            .get(&(from.to_string(), to.to_string()))
            .or(self.default_transition.as_ref())
            .cloned()
    }

    /// Whether a scene is registered under `name`.
    pub fn has_scene(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// Name of the current scene.
    pub fn current_scene(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Scene waiting to become current at the end of the running transition.
    pub fn pending_scene(&self) -> Option<&str> {
        self.active_transition().map(|active| active.target.as_str())
    }

    /// Check if a transition is currently in progress.
    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, SceneState::Transitioning(_))
    }

    /// The transition in progress, if any.
    pub fn active_transition(&self) -> Option<&ActiveTransition> {
        match &self.state {
            SceneState::Transitioning(active) => Some(active.as_ref()),
            SceneState::Idle => None,
        }
    }

    /// The most recently produced output frame.
    pub fn surface(&self) -> &Canvas {
        &self.surface
    }

    /// Handle to the held-key state. Scenes can keep a clone and poll it in
    /// `update`; it keeps tracking keys while a transition withholds events.
    pub fn held_keys(&self) -> HeldKeys {
        self.keys.clone()
    }

    /// Output surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.surface.size()
    }

    /// Switch to `name` immediately, without a transition.
    ///
    /// Calls `on_exit` on the current scene and `on_enter` on the new one. On
    /// an unknown name nothing changes.
    pub fn switch_scene(&mut self, name: &str) -> Result<(), SceneError> {
        if !self.scenes.contains_key(name) {
            return Err(SceneError::UnknownScene(name.to_string()));
        }

        if let Some(current) = self.current.as_deref().and_then(|n| self.scenes.get_mut(n)) {
            current.on_exit();
        }

        info!("switching to scene '{}'", name);
        self.current = Some(name.to_string());
        if let Some(scene) = self.scenes.get_mut(name) {
            scene.on_enter(&self.surface);
        }
        Ok(())
    }

    /// Start a transition to `name`.
    ///
    /// Both scenes are rendered into fresh snapshot buffers up front: the
    /// current scene as it is now, and the target after `on_enter` and one
    /// `update(0.0)`. The current scene only changes, and its `on_exit` only
    /// runs, when the transition completes during a later [`tick`](Self::tick).
    pub fn switch_scene_with_transition(
        &mut self,
        name: &str,
        factory: impl FnOnce() -> Transition,
    ) -> Result<(), SceneError> {
        if !self.scenes.contains_key(name) {
            return Err(SceneError::UnknownScene(name.to_string()));
        }

        let (width, height) = self.size();

        let mut old_frame = Canvas::new(width, height)?;
        if let Some(current) = self.current.as_deref().and_then(|n| self.scenes.get_mut(n)) {
            current.render(&mut old_frame);
        }

        let mut new_frame = Canvas::new(width, height)?;
        if let Some(next) = self.scenes.get_mut(name) {
            next.on_enter(&self.surface);
            next.update(0.0);
            next.render(&mut new_frame);
        }

        let transition = factory();
        info!(
            "starting {} transition {} -> '{}' ({:.2}s)",
            transition.kind(),
            self.current.as_deref().map_or("<none>".to_string(), |c| format!("'{c}'")),
            name,
            transition.duration()
        );

        self.state = SceneState::Transitioning(Box::new(ActiveTransition {
            target: name.to_string(),
            transition,
            old_frame,
            new_frame,
        }));
        Ok(())
    }

    /// Run one tick of the state machine.
    ///
    /// While a transition is in flight it is advanced by `dt` and composited
    /// into the output surface; `events` are not delivered to any scene. When
    /// it completes, the old scene exits and the target becomes current.
    ///
    /// Otherwise `events` go to the current scene. A requested switch starts
    /// the registered transition for that pair (or the default), or switches
    /// immediately if there is none. Without a request the scene is updated
    /// and rendered into the output surface.
    pub fn tick(&mut self, dt: f32, events: &[InputEvent]) -> Result<(), SceneError> {
        self.keys.apply(events);
        match &mut self.state {
            SceneState::Transitioning(active) => {
                active.transition.advance(dt);
                active
                    .transition
                    .composite(&mut self.surface, &active.old_frame, &active.new_frame);
                let complete = active.transition.is_complete();
                if complete {
                    self.finish_transition();
                }
                Ok(())
            }
            SceneState::Idle => self.tick_scene(dt, events),
        }
    }

    fn tick_scene(&mut self, dt: f32, events: &[InputEvent]) -> Result<(), SceneError> {
        let Some(current) = self.current.clone() else {
            return Ok(());
        };
        let Some(scene) = self.scenes.get_mut(&current) else {
            return Ok(());
        };

        if let Some(target) = scene.handle_input(events) {
            return match self.transition_for(&current, &target) {
                Some(factory) => self.switch_scene_with_transition(&target, || factory()),
                None => self.switch_scene(&target),
            };
        }

        if let Some(scene) = self.scenes.get_mut(&current) {
            scene.update(dt);
            scene.render(&mut self.surface);
        }
        Ok(())
    }

    /// Commit the pending switch of a completed transition.
    fn finish_transition(&mut self) {
        let SceneState::Transitioning(active) = std::mem::replace(&mut self.state, SceneState::Idle)
        else {
            return;
        };

        if let Some(current) = self.current.as_deref().and_then(|n| self.scenes.get_mut(n)) {
            current.on_exit();
        }
        info!("transition to '{}' complete", active.target);
        self.current = Some(active.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Color;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Scene that records lifecycle calls and requests a switch on demand.
    struct Probe {
        name: &'static str,
        color: Color,
        log: Log,
        request: Rc<RefCell<Option<String>>>,
    }

    impl Probe {
        fn new(name: &'static str, color: Color, log: &Log) -> (Self, Rc<RefCell<Option<String>>>) {
            let request = Rc::new(RefCell::new(None));
            let probe = Self {
                name,
                color,
                log: Rc::clone(log),
                request: Rc::clone(&request),
            };
            (probe, request)
        }

        fn record(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.name, what));
        }
    }

    impl Scene for Probe {
        fn handle_input(&mut self, _events: &[InputEvent]) -> Option<String> {
            self.request.borrow_mut().take()
        }

        fn update(&mut self, dt: f32) {
            self.record(&format!("update({dt})"));
        }

        fn render(&mut self, target: &mut Canvas) {
            self.record("render");
            target.fill(self.color);
        }

        fn on_enter(&mut self, _surface: &Canvas) {
            self.record("enter");
        }

        fn on_exit(&mut self) {
            self.record("exit");
        }
    }

    const RED: Color = Color::rgb(220, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 220);

    struct Fixture {
        manager: SceneManager,
        log: Log,
        a_request: Rc<RefCell<Option<String>>>,
    }

    fn fixture() -> Fixture {
        let log: Log = Rc::default();
        let mut manager = SceneManager::new(16, 12).unwrap();
        let (a, a_request) = Probe::new("A", RED, &log);
        let (b, _) = Probe::new("B", BLUE, &log);
        manager.add_scene("A", a);
        manager.add_scene("B", b);
        Fixture {
            manager,
            log,
            a_request,
        }
    }

    fn count(log: &Log, entry: &str) -> usize {
        log.borrow().iter().filter(|e| *e == entry).count()
    }

    #[test]
    fn switch_scene_runs_lifecycle_hooks() {
        let Fixture { mut manager, log, .. } = fixture();
        manager.switch_scene("A").unwrap();
        manager.switch_scene("B").unwrap();
        assert_eq!(manager.current_scene(), Some("B"));
        assert_eq!(*log.borrow(), ["A:enter", "A:exit", "B:enter"]);
    }

    #[test]
    fn unknown_scene_leaves_state_unchanged() {
        let Fixture { mut manager, log, .. } = fixture();
        manager.switch_scene("A").unwrap();
        log.borrow_mut().clear();

        assert_eq!(
            manager.switch_scene("DoesNotExist"),
            Err(SceneError::UnknownScene("DoesNotExist".into()))
        );
        assert_eq!(
            manager.switch_scene_with_transition("DoesNotExist", || Transition::fade(1.0)),
            Err(SceneError::UnknownScene("DoesNotExist".into()))
        );
        assert_eq!(manager.current_scene(), Some("A"));
        assert!(!manager.is_transitioning());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn scene_requesting_unknown_scene_is_an_error() {
        let Fixture {
            mut manager,
            a_request,
            ..
        } = fixture();
        manager.switch_scene("A").unwrap();
        *a_request.borrow_mut() = Some("Nowhere".into());
        assert_eq!(
            manager.tick(0.016, &[]),
            Err(SceneError::UnknownScene("Nowhere".into()))
        );
        assert_eq!(manager.current_scene(), Some("A"));
    }

    #[test]
    fn transition_lookup_prefers_exact_pair() {
        let Fixture { mut manager, .. } = fixture();
        assert!(manager.transition_for("A", "B").is_none());

        manager.register_default_transition(|| Transition::slide(0.3));
        manager.register_transition("A", "B", || Transition::fade(1.0));

        let ab = manager.transition_for("A", "B").unwrap()();
        assert_eq!(ab.kind(), crate::TransitionKind::Fade { color: Color::BLACK });
        // Ordered pair: B -> A falls back to the default.
        let ba = manager.transition_for("B", "A").unwrap()();
        assert_eq!(ba.kind(), crate::TransitionKind::Slide);
    }

    #[test]
    fn reregistered_transition_wins() {
        let Fixture {
            mut manager,
            a_request,
            ..
        } = fixture();
        manager.register_transition("A", "B", || Transition::fade(1.0));
        manager.register_transition("A", "B", || Transition::circle_wipe(0.25));
        manager.switch_scene("A").unwrap();

        *a_request.borrow_mut() = Some("B".into());
        manager.tick(0.016, &[]).unwrap();

        let active = manager.active_transition().unwrap();
        assert_eq!(active.transition.kind(), crate::TransitionKind::CircleWipe);
        assert_eq!(active.transition.duration(), 0.25);
    }

    #[test]
    fn factory_is_called_per_switch() {
        let Fixture {
            mut manager,
            a_request,
            ..
        } = fixture();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        manager.register_transition("A", "B", move || {
            *counter.borrow_mut() += 1;
            Transition::fade(0.1)
        });

        for _ in 0..2 {
            manager.switch_scene("A").unwrap();
            *a_request.borrow_mut() = Some("B".into());
            manager.tick(0.016, &[]).unwrap();
            let t = &manager.active_transition().unwrap().transition;
            assert_eq!(t.elapsed(), 0.0);
            manager.tick(0.2, &[]).unwrap();
            assert_eq!(manager.current_scene(), Some("B"));
        }
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn missing_transition_switches_immediately() {
        let Fixture {
            mut manager,
            log,
            a_request,
        } = fixture();
        manager.switch_scene("A").unwrap();
        *a_request.borrow_mut() = Some("B".into());
        manager.tick(0.016, &[]).unwrap();

        assert!(!manager.is_transitioning());
        assert_eq!(manager.current_scene(), Some("B"));
        assert_eq!(count(&log, "A:exit"), 1);
        assert_eq!(count(&log, "B:enter"), 1);
    }

    #[test]
    fn idle_tick_updates_then_renders() {
        let Fixture { mut manager, log, .. } = fixture();
        manager.switch_scene("A").unwrap();
        log.borrow_mut().clear();

        manager.tick(0.25, &[]).unwrap();
        assert_eq!(*log.borrow(), ["A:update(0.25)", "A:render"]);
        assert_eq!(manager.surface().pixel(0, 0), Some(RED));
    }

    #[test]
    fn transition_snapshots_both_scenes() {
        let Fixture {
            mut manager,
            log,
            a_request,
        } = fixture();
        manager.register_default_transition(|| Transition::slide(1.0));
        manager.switch_scene("A").unwrap();
        log.borrow_mut().clear();

        *a_request.borrow_mut() = Some("B".into());
        manager.tick(0.016, &[]).unwrap();

        assert_eq!(
            *log.borrow(),
            ["A:render", "B:enter", "B:update(0)", "B:render"]
        );
        let active = manager.active_transition().unwrap();
        assert_eq!(active.old_frame().pixel(0, 0), Some(RED));
        assert_eq!(active.new_frame().pixel(0, 0), Some(BLUE));
        assert_eq!(manager.pending_scene(), Some("B"));
    }

    #[test]
    fn transition_without_current_scene_uses_blank_old_frame() {
        let Fixture { mut manager, log, .. } = fixture();
        manager
            .switch_scene_with_transition("B", || Transition::fade(1.0))
            .unwrap();

        let active = manager.active_transition().unwrap();
        assert_eq!(active.old_frame().pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(manager.current_scene(), None);
        assert_eq!(*log.borrow(), ["B:enter", "B:update(0)", "B:render"]);
    }

    #[test]
    fn input_is_not_delivered_during_transition() {
        let Fixture {
            mut manager,
            log,
            a_request,
        } = fixture();
        manager.register_transition("A", "B", || Transition::fade(1.0));
        manager.switch_scene("A").unwrap();
        *a_request.borrow_mut() = Some("B".into());
        manager.tick(0.016, &[]).unwrap();
        log.borrow_mut().clear();

        // A second request queued on A must not be picked up mid-transition.
        *a_request.borrow_mut() = Some("A".into());
        manager.tick(0.1, &[InputEvent::Quit]).unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(a_request.borrow().as_deref(), Some("A"));
    }

    #[test]
    fn keys_pressed_during_transition_are_held_afterwards() {
        use winit::keyboard::KeyCode;

        let Fixture {
            mut manager,
            a_request,
            ..
        } = fixture();
        let keys = manager.held_keys();
        manager.register_transition("A", "B", || Transition::fade(1.0));
        manager.switch_scene("A").unwrap();
        *a_request.borrow_mut() = Some("B".into());
        manager.tick(0.016, &[]).unwrap();

        manager
            .tick(0.4, &[InputEvent::KeyDown(KeyCode::ArrowLeft)])
            .unwrap();
        assert!(manager.is_transitioning());
        manager.tick(0.6, &[]).unwrap();

        assert_eq!(manager.current_scene(), Some("B"));
        assert!(keys.key_down(KeyCode::ArrowLeft));

        manager
            .tick(0.016, &[InputEvent::KeyUp(KeyCode::ArrowLeft)])
            .unwrap();
        assert!(!keys.key_down(KeyCode::ArrowLeft));
    }

    #[test]
    fn fade_end_to_end() {
        let Fixture {
            mut manager,
            log,
            a_request,
        } = fixture();
        manager.register_transition("A", "B", || Transition::fade(1.0));
        manager.switch_scene("A").unwrap();

        *a_request.borrow_mut() = Some("B".into());
        manager.tick(0.016, &[]).unwrap();
        assert!(manager.is_transitioning());
        assert_eq!(manager.current_scene(), Some("A"));

        manager.tick(0.5, &[]).unwrap();
        let t = &manager.active_transition().unwrap().transition;
        assert_eq!(t.progress(), 0.5);
        assert!(!t.is_complete());
        assert_eq!(manager.current_scene(), Some("A"));
        assert_eq!(count(&log, "A:exit"), 0);
        assert_eq!(manager.surface().pixel(8, 6), Some(Color::BLACK));

        manager.tick(0.5, &[]).unwrap();
        assert!(!manager.is_transitioning());
        assert_eq!(manager.current_scene(), Some("B"));
        assert_eq!(count(&log, "A:exit"), 1);
        assert_eq!(count(&log, "B:enter"), 1);
        assert_eq!(count(&log, "B:exit"), 0);
        assert_eq!(manager.surface().pixel(8, 6), Some(BLUE));

        // Back to normal ticking on B.
        log.borrow_mut().clear();
        manager.tick(0.016, &[]).unwrap();
        assert_eq!(*log.borrow(), ["B:update(0.016)", "B:render"]);
    }

    #[test]
    fn current_scene_only_changes_on_completion() {
        let Fixture {
            mut manager,
            a_request,
            ..
        } = fixture();
        manager.register_transition("A", "B", || Transition::circle_wipe(0.5));
        manager.switch_scene("A").unwrap();
        *a_request.borrow_mut() = Some("B".into());
        manager.tick(0.016, &[]).unwrap();

        while manager.is_transitioning() {
            let complete = manager
                .active_transition()
                .map(|a| a.transition.is_complete())
                .unwrap_or(false);
            assert!(!complete);
            assert_eq!(manager.current_scene(), Some("A"));
            manager.tick(0.07, &[]).unwrap();
        }
        assert_eq!(manager.current_scene(), Some("B"));
    }

    #[test]
    fn re_adding_a_scene_replaces_it_silently() {
        let Fixture { mut manager, log, .. } = fixture();
        manager.switch_scene("A").unwrap();
        let (replacement, _) = Probe::new("A2", BLUE, &log);
        manager.add_scene("A", replacement);
        assert_eq!(count(&log, "A:exit"), 0);

        manager.tick(0.016, &[]).unwrap();
        assert_eq!(manager.surface().pixel(0, 0), Some(BLUE));
        assert_eq!(count(&log, "A2:render"), 1);
    }
}
