//! Canvas Toys - a handful of animated browser toys
//!
//! Core modules:
//! - `sim`: Deterministic simulation (scheduler, movement, color, pattern search, snake)
//! - `renderer`: Immediate-mode drawing surface (Canvas2D in the browser)
//! - `app`: Toy selection and input routing
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Typed configuration for every toy
//! - `auth`: Client side of the user-management backend

pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod auth;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use app::{KeyAction, Toy, ToyKind, ToyNotice};
pub use highscores::SnakeRecords;
pub use settings::Settings;

/// Shared constants
pub mod consts {
    /// Lowest value a color channel may take
    pub const COLOR_MIN: i32 = 0;
    /// Highest value a color channel may take
    pub const COLOR_MAX: i32 = 255;

    /// Canvas size used when no viewport is available (native runs, tests)
    pub const DEFAULT_WIDTH: i32 = 800;
    pub const DEFAULT_HEIGHT: i32 = 600;
}

/// Inclusive range check
#[inline]
pub fn is_in_range(value: i32, min: i32, max: i32) -> bool {
    value >= min && value <= max
}
