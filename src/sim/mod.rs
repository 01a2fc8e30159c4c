//! Deterministic simulation module
//!
//! All toy logic lives here. This module must be pure and deterministic:
//! - One context struct per running toy, no globals
//! - Seeded RNG only
//! - Boundaries change only through explicit `resize` calls
//! - No rendering or platform dependencies

pub mod color;
pub mod cubes;
pub mod motion;
pub mod pattern;
pub mod placement;
pub mod random;
pub mod scheduler;
pub mod snake;
pub mod tracker;

pub use color::{ColorChannel, ColorRange, RgbOscillator};
pub use cubes::{Cube, CubeField};
pub use motion::{AxisMotion, Bounds, reflect_step, wrap_signed, wrap_to_grid};
pub use pattern::{BudStep, PatternBud, PatternDraw, PatternField, PatternFrame, Trail};
pub use placement::{Placement, Rect, place_food};
pub use scheduler::{FrameDriver, FrameHandle, FrameScheduler};
pub use snake::{Direction, SnakeEvent, SnakeGame, SnakePhase};
pub use tracker::{AxisGradient, GradientDirection, SoundRange, Tracker, TrackerKey};

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Build the seeded RNG every toy context owns
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}
