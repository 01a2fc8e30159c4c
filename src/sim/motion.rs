//! Movement primitives
//!
//! Discrete per-axis stepping: boundary reflection for cubes, grid wraparound
//! for the snake head, signed wraparound for the loop tracker.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Drawable area, (0,0)-(width,height)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Bounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Extent along an axis (0 = x, 1 = y)
    #[inline]
    pub fn axis(&self, axis: usize) -> i32 {
        if axis == 0 { self.width } else { self.height }
    }

    pub fn as_ivec2(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    pub fn center(&self) -> IVec2 {
        IVec2::new(self.width / 2, self.height / 2)
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }
}

/// Per-axis step size and direction bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisMotion {
    pub margin: i32,
    /// `true` moves toward +axis
    pub forward: bool,
}

impl AxisMotion {
    pub fn new(margin: i32, forward: bool) -> Self {
        Self { margin, forward }
    }

    #[inline]
    pub fn delta(&self) -> i32 {
        if self.forward { self.margin } else { -self.margin }
    }
}

/// One reflecting step along a single axis.
///
/// The direction bit flips for the *next* step when the moved entity touches
/// either edge; the current step still applies the un-flipped delta. The
/// returned position is never negative. Callers keep `pos + extent < bound`
/// before the first step, otherwise the entity sticks to the far edge.
pub fn reflect_step(pos: i32, extent: i32, bound: i32, motion: &mut AxisMotion) -> i32 {
    let next = pos + motion.delta();
    if next + extent >= bound || next <= 0 {
        motion.forward = !motion.forward;
    }
    next.max(0)
}

/// Wrap a grid coordinate to the opposite edge
pub fn wrap_to_grid(pos: i32, bound: i32, margin: i32) -> i32 {
    if pos >= bound {
        0
    } else if pos < 0 {
        let cells = (bound as f64 / margin.max(1) as f64).round() as i32;
        cells * margin - margin
    } else {
        pos
    }
}

/// Wrap a signed coordinate living in `[-limit, limit]`
pub fn wrap_signed(value: i32, limit: i32) -> i32 {
    if value > limit {
        -limit
    } else if value < -limit {
        limit
    } else {
        value
    }
}
