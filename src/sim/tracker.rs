//! Loop tracker
//!
//! A position walked with held keys. Each move plays one slice of a
//! footstep clip and the next move waits until that slice finished.
//! Darkness overlays grow with the distance from the origin.

use std::collections::BTreeSet;

use glam::IVec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::motion::wrap_signed;
use super::random::random_pick;
use super::seeded_rng;
use crate::settings::TrackerConfig;

/// Movement keys (AZERTY layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackerKey {
    /// `z`
    Up,
    /// `s`
    Down,
    /// `q`
    Left,
    /// `d`
    Right,
}

impl TrackerKey {
    /// Parse a DOM `KeyboardEvent.key`
    pub fn from_key(key: &str) -> Option<TrackerKey> {
        match key {
            "z" => Some(TrackerKey::Up),
            "s" => Some(TrackerKey::Down),
            "q" => Some(TrackerKey::Left),
            "d" => Some(TrackerKey::Right),
            _ => None,
        }
    }

    /// Unit offset; +y is up for the tracker
    pub fn offset(&self) -> IVec2 {
        match self {
            TrackerKey::Up => IVec2::Y,
            TrackerKey::Down => IVec2::NEG_Y,
            TrackerKey::Left => IVec2::NEG_X,
            TrackerKey::Right => IVec2::X,
        }
    }
}

/// A playable slice of the footstep clip, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundRange {
    pub start: f64,
    pub end: f64,
}

impl SoundRange {
    const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration_ms(&self) -> f64 {
        ((self.end - self.start) * 1000.0).max(0.0)
    }
}

/// Single footsteps inside the clip
pub const SOUND_RANGES: [SoundRange; 12] = [
    SoundRange::new(0.0, 0.9),
    SoundRange::new(0.975, 1.8),
    SoundRange::new(1.832, 2.651),
    SoundRange::new(2.671, 3.291),
    SoundRange::new(3.39, 4.202),
    SoundRange::new(4.28, 5.099),
    SoundRange::new(5.033, 5.924),
    SoundRange::new(5.94, 6.824),
    SoundRange::new(6.854, 7.619),
    SoundRange::new(7.341, 8.201),
    SoundRange::new(9.691, 10.496),
    SoundRange::new(11.095, 11.934),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    Left,
    Right,
    Top,
    Bottom,
}

impl GradientDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradientDirection::Left => "left",
            GradientDirection::Right => "right",
            GradientDirection::Top => "top",
            GradientDirection::Bottom => "bottom",
        }
    }
}

/// Darkness overlay for one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisGradient {
    pub direction: GradientDirection,
    /// Percent where the transparent part ends
    pub stop_start: f64,
    /// Percent where full darkness starts
    pub stop_end: f64,
    pub alpha: f64,
}

impl AxisGradient {
    fn for_axis(value: i32, limit: i32, direction: GradientDirection) -> Self {
        let v = value as f64;
        let limit = limit.max(1) as f64;
        Self {
            direction,
            stop_start: -v.abs() - v / 5.0,
            stop_end: limit - v.abs(),
            alpha: v.abs() / (limit / 2.0),
        }
    }

    /// CSS `linear-gradient(...)` value
    pub fn css(&self) -> String {
        format!(
            "linear-gradient(to {}, transparent {}%, rgba(0, 0, 0, {}) {}%)",
            self.direction.as_str(),
            self.stop_start,
            self.alpha,
            self.stop_end
        )
    }
}

/// Loop toy state
#[derive(Debug, Clone)]
pub struct Tracker {
    pub pos: IVec2,
    pub flashlight: bool,
    pub config: TrackerConfig,
    pressed: BTreeSet<TrackerKey>,
    cooldown: bool,
    range: SoundRange,
    directions: [GradientDirection; 2],
    rng: Pcg32,
}

impl Tracker {
    pub fn new(config: TrackerConfig, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let range = Self::pick_range(&mut rng);
        Self {
            pos: IVec2::ZERO,
            flashlight: false,
            config,
            pressed: BTreeSet::new(),
            cooldown: false,
            range,
            directions: [GradientDirection::Left, GradientDirection::Top],
            rng,
        }
    }

    fn pick_range(rng: &mut Pcg32) -> SoundRange {
        random_pick(rng, &SOUND_RANGES)
            .copied()
            .unwrap_or(SOUND_RANGES[0])
    }

    /// Key pressed. Returns `false` for keys the toy ignores.
    pub fn key_down(&mut self, key: &str) -> bool {
        if key == " " {
            self.flashlight = !self.flashlight;
            return true;
        }
        match TrackerKey::from_key(key) {
            Some(k) => {
                self.pressed.insert(k);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(k) = TrackerKey::from_key(key) {
            self.pressed.remove(&k);
        }
    }

    pub fn is_cooling_down(&self) -> bool {
        self.cooldown
    }

    pub fn sound_range(&self) -> SoundRange {
        self.range
    }

    /// Advance one frame. Returns the slice to play when the tracker moved.
    pub fn step(&mut self, clip_idle: bool) -> Option<SoundRange> {
        if !clip_idle || self.cooldown || self.pressed.is_empty() {
            return None;
        }
        self.cooldown = true;

        let margin = self.config.margin;
        let delta: IVec2 = self.pressed.iter().map(|k| k.offset() * margin).sum();
        let limits = [self.config.max_width, self.config.max_height];
        let moved = self.pos + delta;

        for axis in 0..2 {
            let value = wrap_signed(moved[axis], limits[axis]);
            self.pos[axis] = value;
            if value != 0 {
                self.directions[axis] = match (axis, value < 0) {
                    (0, true) => GradientDirection::Left,
                    (0, false) => GradientDirection::Right,
                    (_, true) => GradientDirection::Bottom,
                    (_, false) => GradientDirection::Top,
                };
            }
        }

        log::debug!("Tracker moved to {}", self.pos);
        Some(self.range)
    }

    /// The played slice ended: allow the next move with a fresh slice
    pub fn clip_finished(&mut self) {
        self.cooldown = false;
        self.range = Self::pick_range(&mut self.rng);
    }

    /// Overlays for x and y
    pub fn gradients(&self) -> [AxisGradient; 2] {
        [
            AxisGradient::for_axis(self.pos.x, self.config.max_width, self.directions[0]),
            AxisGradient::for_axis(self.pos.y, self.config.max_height, self.directions[1]),
        ]
    }

    /// `(x, y)` readout
    pub fn label(&self) -> String {
        format!("({}, {})", self.pos.x, self.pos.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_once_per_clip() {
        let mut t = Tracker::new(TrackerConfig::default(), 1);
        assert!(t.key_down("d"));
        let range = t.step(true);
        assert!(range.is_some());
        assert_eq!(t.pos, IVec2::new(5, 0));

        // Cooling down until the clip ends
        assert_eq!(t.step(true), None);
        t.clip_finished();
        t.step(true);
        assert_eq!(t.pos, IVec2::new(10, 0));
    }

    #[test]
    fn test_no_move_while_clip_playing_or_idle_keys() {
        let mut t = Tracker::new(TrackerConfig::default(), 2);
        assert_eq!(t.step(true), None);
        t.key_down("z");
        assert_eq!(t.step(false), None);
        assert!(!t.is_cooling_down());
        t.key_up("z");
        assert_eq!(t.step(true), None);
    }

    #[test]
    fn test_held_keys_combine() {
        let mut t = Tracker::new(TrackerConfig::default(), 3);
        t.key_down("z");
        t.key_down("q");
        t.step(true);
        assert_eq!(t.pos, IVec2::new(-5, 5));
    }

    #[test]
    fn test_wraps_past_limit() {
        let mut t = Tracker::new(TrackerConfig::default(), 4);
        t.pos = IVec2::new(255, -255);
        t.key_down("d");
        t.key_down("s");
        t.step(true);
        assert_eq!(t.pos, IVec2::new(-255, 255));
    }

    #[test]
    fn test_space_toggles_flashlight() {
        let mut t = Tracker::new(TrackerConfig::default(), 5);
        assert!(t.key_down(" "));
        assert!(t.flashlight);
        t.key_down(" ");
        assert!(!t.flashlight);
        assert!(!t.key_down("x"));
    }

    #[test]
    fn test_gradients() {
        let mut t = Tracker::new(TrackerConfig::default(), 6);
        t.pos = IVec2::new(-50, 0);
        t.key_down("q");
        t.step(true);
        let [gx, gy] = t.gradients();
        assert_eq!(gx.direction, GradientDirection::Left);
        // v = -55: -55 + 11
        assert!((gx.stop_start - (-44.0)).abs() < 1e-9);
        assert!((gx.stop_end - 200.0).abs() < 1e-9);
        assert!((gx.alpha - 55.0 / 127.5).abs() < 1e-9);
        // y untouched at zero keeps its initial direction
        assert_eq!(gy.direction, GradientDirection::Top);
        assert_eq!(gy.alpha, 0.0);
        assert!(gx.css().starts_with("linear-gradient(to left, transparent -44%"));
    }

    #[test]
    fn test_new_range_after_clip() {
        let mut t = Tracker::new(TrackerConfig::default(), 7);
        for _ in 0..20 {
            t.clip_finished();
            assert!(SOUND_RANGES.contains(&t.sound_range()));
            assert!(t.sound_range().duration_ms() > 0.0);
        }
    }

    #[test]
    fn test_label() {
        let mut t = Tracker::new(TrackerConfig::default(), 8);
        t.pos = IVec2::new(-5, 10);
        assert_eq!(t.label(), "(-5, 10)");
    }
}
