//! Food placement by grid subdivision
//!
//! The canvas is split into quadrants until some rectangle holds no snake
//! segment, then a grid cell inside that rectangle is picked. A bounded
//! number of subdivision levels keeps the search finite on crowded boards.

use glam::IVec2;
use rand::Rng;

use super::motion::Bounds;
use super::random::{random_int, random_pick};

/// Axis-aligned search rectangle, half-open on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self {
            x: 0,
            y: 0,
            width: bounds.width,
            height: bounds.height,
        }
    }

    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    /// Four quadrants covering this rect exactly
    pub fn subdivide(&self) -> [Rect; 4] {
        let (lw, lh) = (self.width / 2, self.height / 2);
        let (rw, rh) = (self.width - lw, self.height - lh);
        [
            Rect { x: self.x, y: self.y, width: lw, height: lh },
            Rect { x: self.x + lw, y: self.y, width: rw, height: lh },
            Rect { x: self.x, y: self.y + lh, width: lw, height: rh },
            Rect { x: self.x + lw, y: self.y + lh, width: rw, height: rh },
        ]
    }

    /// Grid coordinates along one axis that fall inside `[start, start + len)` and `[0, bound)`
    fn grid_span(start: i32, len: i32, bound: i32, margin: i32) -> Option<(i32, i32)> {
        let lo = start.max(0);
        let hi = (start + len).min(bound);
        let first = (lo + margin - 1).div_euclid(margin) * margin;
        if first >= hi {
            return None;
        }
        let last = (hi - 1).div_euclid(margin) * margin;
        Some((first, last))
    }

    fn grid_spans(&self, bounds: Bounds, margin: i32) -> Option<((i32, i32), (i32, i32))> {
        let xs = Self::grid_span(self.x, self.width, bounds.width, margin)?;
        let ys = Self::grid_span(self.y, self.height, bounds.height, margin)?;
        Some((xs, ys))
    }
}

/// Where the food ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Found in a free rectangle
    Subdivided(IVec2),
    /// Subdivision budget ran out; grid scan from the canvas center
    Fallback(IVec2),
}

impl Placement {
    pub fn pos(&self) -> IVec2 {
        match *self {
            Placement::Subdivided(p) | Placement::Fallback(p) => p,
        }
    }
}

/// Pick a grid cell not covered by `occupied`.
///
/// Never returns an occupied cell unless every grid cell is occupied.
pub fn place_food<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: Bounds,
    margin: i32,
    occupied: &[IVec2],
    max_depth: u32,
) -> Placement {
    let margin = margin.max(1);
    let mut rects = vec![Rect::from_bounds(bounds)];

    for _ in 0..max_depth {
        let mut valid = Vec::new();
        let mut blocked = 0usize;

        for rect in &rects {
            match rect.grid_spans(bounds, margin) {
                Some(spans) if !occupied.iter().any(|p| rect.contains(*p)) => valid.push(spans),
                _ => blocked += 1,
            }
        }

        if let Some(&((x0, x1), (y0, y1))) = random_pick(rng, &valid) {
            let x = x0 + random_int(rng, 0, (x1 - x0) / margin) * margin;
            let y = y0 + random_int(rng, 0, (y1 - y0) / margin) * margin;
            return Placement::Subdivided(IVec2::new(x, y));
        }

        if blocked as f64 >= rects.len() as f64 * 0.75 {
            rects = rects.iter().flat_map(Rect::subdivide).collect();
        }
    }

    Placement::Fallback(scan_from_center(bounds, margin, occupied))
}

fn scan_from_center(bounds: Bounds, margin: i32, occupied: &[IVec2]) -> IVec2 {
    let cols = ((bounds.width + margin - 1) / margin).max(1);
    let rows = ((bounds.height + margin - 1) / margin).max(1);
    let snap = |extent: i32, cells: i32| {
        ((extent as f64 / 2.0 / margin as f64).round() as i32).clamp(0, cells - 1)
    };
    let (cx, cy) = (snap(bounds.width, cols), snap(bounds.height, rows));
    let center = IVec2::new(cx * margin, cy * margin);

    let total = cols * rows;
    let start = cy * cols + cx;
    (0..total)
        .map(|i| {
            let idx = (start + i) % total;
            IVec2::new(idx % cols * margin, idx / cols * margin)
        })
        .find(|cell| !occupied.contains(cell))
        .unwrap_or_else(|| {
            log::warn!("No free cell left for food, using the center");
            center
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::seeded_rng;
    use proptest::prelude::*;

    #[test]
    fn test_single_segment_in_center() {
        let bounds = Bounds::new(400, 400);
        let snake = [IVec2::new(200, 200)];
        let mut rng = seeded_rng(1);
        for _ in 0..200 {
            let placement = place_food(&mut rng, bounds, 20, &snake, 3);
            assert!(matches!(placement, Placement::Subdivided(_)));
            let p = placement.pos();
            assert_ne!(p, IVec2::new(200, 200));
            assert_eq!(p.x % 20, 0);
            assert_eq!(p.y % 20, 0);
            assert!(bounds.contains(p));
        }
    }

    #[test]
    fn test_empty_board_uses_full_canvas() {
        let mut rng = seeded_rng(2);
        let p = place_food(&mut rng, Bounds::new(100, 60), 20, &[], 3);
        assert!(matches!(p, Placement::Subdivided(_)));
        assert!(Bounds::new(100, 60).contains(p.pos()));
    }

    #[test]
    fn test_subdivide_covers_rect() {
        let r = Rect { x: 10, y: 0, width: 7, height: 5 };
        let parts = r.subdivide();
        let area: i32 = parts.iter().map(|q| q.width * q.height).sum();
        assert_eq!(area, 35);
        assert_eq!(parts[3], Rect { x: 13, y: 2, width: 4, height: 3 });
    }

    #[test]
    fn test_grid_span_clips_to_bounds() {
        assert_eq!(Rect::grid_span(0, 100, 100, 20), Some((0, 80)));
        assert_eq!(Rect::grid_span(30, 20, 100, 20), Some((40, 40)));
        assert_eq!(Rect::grid_span(41, 10, 100, 20), None);
        assert_eq!(Rect::grid_span(90, 40, 100, 20), None);
    }

    #[test]
    fn test_fallback_skips_occupied_center() {
        // Every cell except the last one is taken: subdivision cannot help
        let bounds = Bounds::new(60, 60);
        let mut occupied = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                occupied.push(IVec2::new(x * 20, y * 20));
            }
        }
        let free = occupied.pop().unwrap();
        let mut rng = seeded_rng(3);
        let p = place_food(&mut rng, bounds, 20, &occupied, 3);
        assert_eq!(p.pos(), free);
    }

    #[test]
    fn test_full_board_returns_center() {
        let bounds = Bounds::new(40, 40);
        let occupied = [
            IVec2::new(0, 0),
            IVec2::new(20, 0),
            IVec2::new(0, 20),
            IVec2::new(20, 20),
        ];
        let mut rng = seeded_rng(4);
        let p = place_food(&mut rng, bounds, 20, &occupied, 3);
        assert_eq!(p, Placement::Fallback(IVec2::new(20, 20)));
    }

    proptest! {
        #[test]
        fn food_never_on_segment(
            seed in any::<u64>(),
            cells in proptest::collection::vec((0i32..20, 0i32..15), 0..280),
        ) {
            let bounds = Bounds::new(400, 300);
            let occupied: Vec<IVec2> = cells.iter().map(|&(x, y)| IVec2::new(x * 20, y * 20)).collect();
            let mut rng = seeded_rng(seed);
            let p = place_food(&mut rng, bounds, 20, &occupied, 3).pos();
            prop_assert!(!occupied.contains(&p));
            prop_assert!(bounds.contains(p));
            prop_assert_eq!(p.x % 20, 0);
            prop_assert_eq!(p.y % 20, 0);
        }
    }
}
