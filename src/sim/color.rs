//! Color oscillator
//!
//! Every channel ping-pongs between `min` and `max`, one unit per frame.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::random::{random_bool, random_int};
use crate::consts::{COLOR_MAX, COLOR_MIN};

/// Inclusive channel range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub min: i32,
    pub max: i32,
}

impl Default for ColorRange {
    fn default() -> Self {
        Self {
            min: COLOR_MIN,
            max: COLOR_MAX,
        }
    }
}

impl ColorRange {
    /// Range with `min <= max`, both inside 0..=255
    pub fn normalized(self) -> Self {
        let min = self.min.clamp(COLOR_MIN, COLOR_MAX);
        let max = self.max.clamp(COLOR_MIN, COLOR_MAX);
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }
}

/// A single oscillating channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorChannel {
    pub value: i32,
    pub increasing: bool,
}

impl ColorChannel {
    pub fn new(value: i32, increasing: bool) -> Self {
        Self { value, increasing }
    }

    /// Advance one frame, bouncing off the range edges
    pub fn step(&mut self, range: ColorRange) {
        self.value += if self.increasing { 1 } else { -1 };

        if self.value <= range.min {
            self.value = range.min;
            self.increasing = true;
        } else if self.value >= range.max {
            self.value = range.max;
            self.increasing = false;
        }
    }
}

/// Three independent channels composing an RGB fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbOscillator {
    pub channels: [ColorChannel; 3],
}

impl RgbOscillator {
    /// Fixed starting color with the given direction bits
    pub fn from_rgb(rgb: [u8; 3], increasing: [bool; 3]) -> Self {
        Self {
            channels: [0, 1, 2].map(|i| ColorChannel::new(rgb[i] as i32, increasing[i])),
        }
    }

    /// Random value and direction for every channel
    pub fn random<R: Rng + ?Sized>(rng: &mut R, range: ColorRange) -> Self {
        let mut channel = || {
            ColorChannel::new(random_int(rng, range.min, range.max), random_bool(rng, 0.5))
        };
        Self {
            channels: [channel(), channel(), channel()],
        }
    }

    pub fn step(&mut self, range: ColorRange) {
        for channel in &mut self.channels {
            channel.step(range);
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        self.channels.map(|c| c.value.clamp(0, 255) as u8)
    }

    /// CSS `rgb(r, g, b)` string
    pub fn css(&self) -> String {
        let [r, g, b] = self.rgb();
        format!("rgb({}, {}, {})", r, g, b)
    }
}
