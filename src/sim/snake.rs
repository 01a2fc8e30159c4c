//! Snake game
//!
//! Grid-stepped body with follow-the-leader movement, wraparound edges,
//! self-collision death and apple growth.

use glam::IVec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::motion::{Bounds, wrap_to_grid};
use super::placement::{Placement, place_food};
use super::random::random_int_multiple;
use super::seeded_rng;
use crate::settings::SnakeConfig;

/// Heading of the head segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Unit offset (screen coordinates, +y is down)
    pub fn offset(&self) -> IVec2 {
        match self {
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
        }
    }

    /// Parse a DOM `KeyboardEvent.code` such as `ArrowLeft`
    pub fn from_key_code(code: &str) -> Option<Direction> {
        match code.to_lowercase().strip_prefix("arrow")? {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakePhase {
    Alive,
    Dead,
}

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeEvent {
    Moved,
    Ate { score: u32 },
    Died { score: u32, high_score: u32, deaths: u32 },
}

/// One snake run plus the scores that survive deaths
#[derive(Debug, Clone)]
pub struct SnakeGame {
    /// Head at index 0
    pub body: Vec<IVec2>,
    pub apple: IVec2,
    pub direction: Direction,
    pub phase: SnakePhase,
    pub score: u32,
    pub high_score: u32,
    pub deaths: u32,
    pub bounds: Bounds,
    pub config: SnakeConfig,
    rng: Pcg32,
}

impl SnakeGame {
    pub fn new(config: SnakeConfig, bounds: Bounds, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let margin = config.margin.max(1);
        let head = IVec2::new(
            random_int_multiple(&mut rng, margin, bounds.width - margin, margin),
            random_int_multiple(&mut rng, margin, bounds.height - margin, margin),
        );
        let apple = place_food(&mut rng, bounds, margin, &[head], config.placement_depth).pos();
        Self {
            body: vec![head],
            apple,
            direction: Direction::Left,
            phase: SnakePhase::Alive,
            score: 0,
            high_score: 0,
            deaths: 0,
            bounds,
            config,
            rng,
        }
    }

    #[inline]
    fn margin(&self) -> i32 {
        self.config.margin.max(1)
    }

    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    pub fn is_alive(&self) -> bool {
        self.phase == SnakePhase::Alive
    }

    /// Change heading. Reversing onto the body is refused while longer than one segment.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.body.len() > 1 && direction == self.direction.opposite() {
            return false;
        }
        self.direction = direction;
        true
    }

    /// Advance one frame. A dead snake does not move.
    pub fn step(&mut self) -> Option<SnakeEvent> {
        if !self.is_alive() {
            return None;
        }

        let head = self.head();
        if self.body[1..].contains(&head) {
            self.phase = SnakePhase::Dead;
            self.deaths += 1;
            let event = SnakeEvent::Died {
                score: self.score,
                high_score: self.high_score,
                deaths: self.deaths,
            };
            log::info!(
                "Snake died: score {}, high score {}, deaths {}",
                self.score,
                self.high_score,
                self.deaths
            );
            self.score = 0;
            return Some(event);
        }

        let mut event = SnakeEvent::Moved;
        if head == self.apple {
            self.score += 1;
            self.high_score = self.high_score.max(self.score);
            if let Some(&tail) = self.body.last() {
                self.body.push(tail);
            }
            self.relocate_apple();
            event = SnakeEvent::Ate { score: self.score };
        }

        self.advance();
        Some(event)
    }

    fn advance(&mut self) {
        for i in (1..self.body.len()).rev() {
            self.body[i] = self.body[i - 1];
        }
        let margin = self.margin();
        let mut head = self.body[0] + self.direction.offset() * margin;
        head.x = wrap_to_grid(head.x, self.bounds.width, margin);
        head.y = wrap_to_grid(head.y, self.bounds.height, margin);
        self.body[0] = head;
    }

    fn relocate_apple(&mut self) {
        let margin = self.margin();
        let placement = place_food(
            &mut self.rng,
            self.bounds,
            margin,
            &self.body,
            self.config.placement_depth,
        );
        if let Placement::Fallback(p) = placement {
            log::debug!("Apple placed by fallback at {}", p);
        }
        self.apple = placement.pos();
    }

    /// Start a new run after death: one random segment, scores kept
    pub fn revive(&mut self) {
        let margin = self.margin();
        let head = IVec2::new(
            random_int_multiple(&mut self.rng, margin, self.bounds.width - margin, margin),
            random_int_multiple(&mut self.rng, margin, self.bounds.height - margin, margin),
        );
        self.body = vec![head];
        self.phase = SnakePhase::Alive;
        if self.apple == head {
            self.relocate_apple();
        }
        log::info!("Snake revived at {}", head);
    }

    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        if !bounds.contains(self.apple) {
            self.relocate_apple();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with_body(body: Vec<IVec2>, direction: Direction) -> SnakeGame {
        let mut game = SnakeGame::new(SnakeConfig::default(), Bounds::new(400, 400), 1);
        game.body = body;
        game.direction = direction;
        game.apple = IVec2::new(380, 380);
        game
    }

    #[test]
    fn test_follow_the_leader() {
        let body = vec![IVec2::new(100, 100), IVec2::new(120, 100), IVec2::new(140, 100)];
        let mut game = game_with_body(body.clone(), Direction::Left);
        assert_eq!(game.step(), Some(SnakeEvent::Moved));
        assert_eq!(game.body[1], body[0]);
        assert_eq!(game.body[2], body[1]);
        assert_eq!(game.body[0], IVec2::new(80, 100));
    }

    #[test]
    fn test_reversal_locked_when_long() {
        let mut game = game_with_body(vec![IVec2::new(100, 100), IVec2::new(120, 100)], Direction::Left);
        assert!(!game.set_direction(Direction::Right));
        assert_eq!(game.direction, Direction::Left);
        assert!(game.set_direction(Direction::Up));
    }

    #[test]
    fn test_single_segment_may_reverse() {
        let mut game = game_with_body(vec![IVec2::new(100, 100)], Direction::Left);
        assert!(game.set_direction(Direction::Right));
        assert_eq!(game.direction, Direction::Right);
    }

    #[test]
    fn test_wraps_left_edge() {
        let mut game = game_with_body(vec![IVec2::new(0, 100)], Direction::Left);
        game.step();
        assert_eq!(game.head(), IVec2::new(380, 100));
    }

    #[test]
    fn test_wraps_bottom_edge() {
        let mut game = game_with_body(vec![IVec2::new(100, 380)], Direction::Down);
        game.step();
        assert_eq!(game.head(), IVec2::new(100, 0));
    }

    #[test]
    fn test_eating_grows_and_relocates() {
        let mut game = game_with_body(vec![IVec2::new(100, 100), IVec2::new(120, 100)], Direction::Left);
        game.apple = IVec2::new(100, 100);
        assert_eq!(game.step(), Some(SnakeEvent::Ate { score: 1 }));
        assert_eq!(game.body.len(), 3);
        assert_eq!(game.high_score, 1);
        assert!(!game.body[1..].contains(&game.apple));
        // New tail followed into the old tail spot
        assert_eq!(game.body[2], IVec2::new(120, 100));
    }

    #[test]
    fn test_self_collision_kills() {
        let head = IVec2::new(100, 100);
        let body = vec![head, IVec2::new(120, 100), IVec2::new(120, 120), head];
        let mut game = game_with_body(body, Direction::Left);
        game.score = 3;
        game.high_score = 5;

        assert_eq!(
            game.step(),
            Some(SnakeEvent::Died { score: 3, high_score: 5, deaths: 1 })
        );
        assert_eq!(game.phase, SnakePhase::Dead);
        assert_eq!(game.score, 0);
        assert_eq!(game.step(), None);
    }

    #[test]
    fn test_revive_resets_body() {
        let head = IVec2::new(100, 100);
        let mut game = game_with_body(vec![head, IVec2::new(120, 100), head], Direction::Left);
        game.step();
        game.revive();
        assert!(game.is_alive());
        assert_eq!(game.body.len(), 1);
        assert_eq!(game.deaths, 1);
        let h = game.head();
        assert_eq!(h.x % 20, 0);
        assert!(h.x >= 20 && h.x <= 380);
        assert_ne!(h, game.apple);
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Direction::from_key_code("ArrowUp"), Some(Direction::Up));
        assert_eq!(Direction::from_key_code("arrowleft"), Some(Direction::Left));
        assert_eq!(Direction::from_key_code("KeyA"), None);
    }

    #[test]
    fn test_new_game_apple_not_on_head() {
        for seed in 0..50 {
            let game = SnakeGame::new(SnakeConfig::default(), Bounds::new(400, 400), seed);
            assert_ne!(game.apple, game.head());
        }
    }
}
