use std::rc::Rc;

use env_logger::Env;
use log::{error, info, warn};

use segue::{
    AppConfig, AppError, Canvas, Color, HeldKeys, InputEvent, KeyCode, Scene, SceneManager,
    TextPainter, Transition, Vec2, key_pressed,
};

const PLAYER_RADIUS: f32 = 25.0;
const PLAYER_SPEED: f32 = 300.0;

struct MainMenu {
    text: Option<Rc<TextPainter>>,
}

impl Scene for MainMenu {
    fn handle_input(&mut self, events: &[InputEvent]) -> Option<String> {
        key_pressed(events, KeyCode::Space).then(|| "GameScene".to_string())
    }

    fn update(&mut self, _dt: f32) {}

    fn render(&mut self, target: &mut Canvas) {
        target.fill(Color::rgb(50, 50, 100));
        if let Some(text) = &self.text {
            let center = target.center();
            text.draw_centered(
                target,
                "Main Menu - Press SPACE to Start",
                center.x,
                center.y - 24.0,
                48.0,
                Color::WHITE,
            );
        }
    }
}

struct GameScene {
    text: Option<Rc<TextPainter>>,
    keys: HeldKeys,
    player: Vec2,
    bounds: Vec2,
}

impl GameScene {
    fn new(width: u32, height: u32, keys: HeldKeys, text: Option<Rc<TextPainter>>) -> Self {
        let bounds = Vec2::new(width as f32, height as f32);
        Self {
            text,
            keys,
            player: bounds / 2.0,
            bounds,
        }
    }
}

impl Scene for GameScene {
    fn handle_input(&mut self, events: &[InputEvent]) -> Option<String> {
        key_pressed(events, KeyCode::Escape).then(|| "MainMenu".to_string())
    }

    fn update(&mut self, dt: f32) {
        let mut dir = Vec2::ZERO;
        if self.keys.key_down(KeyCode::ArrowLeft) {
            dir.x -= 1.0;
        }
        if self.keys.key_down(KeyCode::ArrowRight) {
            dir.x += 1.0;
        }
        if self.keys.key_down(KeyCode::ArrowUp) {
            dir.y -= 1.0;
        }
        if self.keys.key_down(KeyCode::ArrowDown) {
            dir.y += 1.0;
        }

        self.player += dir * PLAYER_SPEED * dt;
        self.player = self
            .player
            .clamp(Vec2::splat(PLAYER_RADIUS), self.bounds - PLAYER_RADIUS);
    }

    fn render(&mut self, target: &mut Canvas) {
        target.fill(Color::rgb(100, 150, 50));
        target.fill_circle(self.player.round(), PLAYER_RADIUS, Color::RED);
        if let Some(text) = &self.text {
            text.draw(
                target,
                "Use Arrow Keys to Move. ESC to return to Menu.",
                10.0,
                10.0,
                24.0,
                Color::BLACK,
            );
        }
    }
}

fn run_demo() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading config from {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::new().title("Segue Demo"),
    };

    let text = config.font_path.as_ref().and_then(|path| match TextPainter::from_file(path) {
        Ok(painter) => Some(Rc::new(painter)),
        Err(e) => {
            warn!("drawing without text: {}", e);
            None
        }
    });

    let mut manager = SceneManager::new(config.width, config.height)?;
    manager.add_scene("MainMenu", MainMenu { text: text.clone() });
    let keys = manager.held_keys();
    manager.add_scene(
        "GameScene",
        GameScene::new(config.width, config.height, keys, text),
    );

    manager.register_transition("MainMenu", "GameScene", || Transition::fade(1.0));
    manager.register_transition("GameScene", "MainMenu", || Transition::fade(0.8));
    manager.register_default_transition(|| Transition::circle_wipe(0.8));

    manager.run("MainMenu", config)
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run_demo() {
        error!("{}", e);
        std::process::exit(1);
    }
}
