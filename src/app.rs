//! Toy selection and input routing
//!
//! One [`Toy`] is active per page. The front end forwards frames and input
//! events here and reacts to the returned [`KeyAction`] / [`ToyNotice`].

use glam::IVec2;

use crate::renderer::{Surface, scene};
use crate::settings::{PatternConfig, Settings};
use crate::sim::{
    Bounds, CubeField, Direction, PatternField, SnakeEvent, SnakeGame, SoundRange, Tracker,
};

/// Which toy a page runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToyKind {
    #[default]
    Cubes,
    Pattern,
    Snake,
    Loop,
}

impl ToyKind {
    pub const ALL: [ToyKind; 4] = [ToyKind::Cubes, ToyKind::Pattern, ToyKind::Snake, ToyKind::Loop];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToyKind::Cubes => "cubes",
            ToyKind::Pattern => "pattern",
            ToyKind::Snake => "snake",
            ToyKind::Loop => "loop",
        }
    }

    /// Parse a toy name, with or without a leading `#`
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().trim_start_matches('#').to_lowercase().as_str() {
            "cubes" | "cube" => Some(ToyKind::Cubes),
            "pattern" | "patterns" => Some(ToyKind::Pattern),
            "snake" => Some(ToyKind::Snake),
            "loop" => Some(ToyKind::Loop),
            _ => None,
        }
    }

    /// Page title
    pub fn title(&self) -> &'static str {
        match self {
            ToyKind::Cubes => "Cubes",
            ToyKind::Pattern => "Patterns",
            ToyKind::Snake => "Snake",
            ToyKind::Loop => "The loop",
        }
    }
}

/// What the front end should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    TogglePause,
}

/// Something the front end has to surface outside the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToyNotice {
    /// The snake died; the front end pauses and shows the scores
    GameOver {
        score: u32,
        high_score: u32,
        deaths: u32,
        length: u32,
    },
    /// The loop tracker moved; play this clip slice
    PlayClip(SoundRange),
}

/// A running toy
#[derive(Debug, Clone)]
pub enum Toy {
    Cubes(CubeField),
    Pattern(PatternField),
    Snake(SnakeGame),
    Loop(Tracker),
}

impl Toy {
    pub fn new(kind: ToyKind, settings: &Settings, bounds: Bounds, seed: u64) -> Self {
        log::info!("Starting {} ({}x{})", kind.as_str(), bounds.width, bounds.height);
        match kind {
            ToyKind::Cubes => Toy::Cubes(CubeField::new(settings.cubes.clone(), bounds, seed)),
            ToyKind::Pattern => {
                Toy::Pattern(PatternField::new(settings.pattern.clone(), bounds, seed))
            }
            ToyKind::Snake => Toy::Snake(SnakeGame::new(settings.snake.clone(), bounds, seed)),
            ToyKind::Loop => Toy::Loop(Tracker::new(settings.tracker.clone(), seed)),
        }
    }

    pub fn kind(&self) -> ToyKind {
        match self {
            Toy::Cubes(_) => ToyKind::Cubes,
            Toy::Pattern(_) => ToyKind::Pattern,
            Toy::Snake(_) => ToyKind::Snake,
            Toy::Loop(_) => ToyKind::Loop,
        }
    }

    /// Simulation rate
    pub fn frame_delay_ms(&self) -> f64 {
        match self {
            Toy::Cubes(field) => field.config.frame_delay_ms,
            Toy::Pattern(field) => field.config.frame_delay_ms,
            Toy::Snake(game) => game.config.frame_delay_ms,
            Toy::Loop(tracker) => tracker.config.frame_delay_ms,
        }
    }

    /// Paint the initial background. Pattern trails accumulate on top of it.
    pub fn draw_background<S: Surface + ?Sized>(&self, surface: &mut S) {
        match self {
            Toy::Loop(tracker) => scene::draw_tracker(surface, tracker),
            _ => surface.clear(scene::BACKGROUND),
        }
    }

    /// Run one simulation step and paint it
    pub fn step<S: Surface + ?Sized>(&mut self, surface: &mut S, clip_idle: bool) -> Option<ToyNotice> {
        match self {
            Toy::Cubes(field) => {
                field.step();
                scene::draw_cubes(surface, field);
                None
            }
            Toy::Pattern(field) => {
                let frame = field.step();
                scene::draw_pattern_frame(surface, &frame, &field.config);
                None
            }
            Toy::Snake(game) => {
                let event = game.step();
                scene::draw_snake(surface, game);
                match event {
                    Some(SnakeEvent::Died { score, high_score, deaths }) => Some(ToyNotice::GameOver {
                        score,
                        high_score,
                        deaths,
                        length: game.body.len() as u32,
                    }),
                    _ => None,
                }
            }
            Toy::Loop(tracker) => {
                let played = tracker.step(clip_idle);
                scene::draw_tracker(surface, tracker);
                played.map(ToyNotice::PlayClip)
            }
        }
    }

    /// Route a key press. `code` is `KeyboardEvent.code`, `key` is `KeyboardEvent.key`.
    pub fn key_down(&mut self, code: &str, key: &str) -> KeyAction {
        let is_space = code.eq_ignore_ascii_case("space");
        match self {
            Toy::Loop(tracker) => {
                tracker.key_down(key);
                KeyAction::None
            }
            Toy::Snake(game) => {
                if is_space {
                    return KeyAction::TogglePause;
                }
                if let Some(direction) = Direction::from_key_code(code) {
                    game.set_direction(direction);
                }
                KeyAction::None
            }
            Toy::Cubes(_) | Toy::Pattern(_) if is_space => KeyAction::TogglePause,
            _ => KeyAction::None,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Toy::Loop(tracker) = self {
            tracker.key_up(key);
        }
    }

    /// Called when the loop is resumed; a dead snake starts a new run
    pub fn on_resume(&mut self) {
        if let Toy::Snake(game) = self {
            if !game.is_alive() {
                game.revive();
            }
        }
    }

    /// Carry a stored high score into the snake
    pub fn restore_high_score(&mut self, best: u32) {
        if let Toy::Snake(game) = self {
            game.high_score = game.high_score.max(best);
        }
    }

    pub fn pointer_moved(&mut self, pos: IVec2) {
        if let Toy::Pattern(field) = self {
            field.set_cursor(pos);
        }
    }

    /// The loop tracker's clip slice ended
    pub fn clip_finished(&mut self) {
        if let Toy::Loop(tracker) = self {
            tracker.clip_finished();
        }
    }

    /// Swap the pattern configuration; `false` for other toys
    pub fn reconfigure_pattern(&mut self, config: PatternConfig) -> bool {
        match self {
            Toy::Pattern(field) => {
                field.reconfigure(config);
                true
            }
            _ => false,
        }
    }

    pub fn resize(&mut self, bounds: Bounds) {
        match self {
            Toy::Cubes(field) => field.resize(bounds),
            Toy::Pattern(field) => field.resize(bounds),
            Toy::Snake(game) => game.resize(bounds),
            Toy::Loop(_) => {}
        }
    }
}
