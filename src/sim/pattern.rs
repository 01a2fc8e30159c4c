//! Pattern drawer
//!
//! Every bud walks toward its target on a `margin` grid, mixing greedy steps
//! with random ones. A bud never revisits a position and never crosses the
//! midpoint of an earlier step. Buds that reach their target or run out of
//! retries are replaced by a freshly spawned bud.

use glam::IVec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::color::RgbOscillator;
use super::motion::Bounds;
use super::random::{random_bool, random_int, random_pick};
use super::seeded_rng;
use crate::is_in_range;
use crate::settings::{FadeTrigger, HitboxKind, OriginChoice, PatternConfig};

/// A single walker
#[derive(Debug, Clone)]
pub struct PatternBud {
    pub pos: IVec2,
    pub target: IVec2,
    /// Visited positions in order. Consecutive entries are the recorded steps.
    pub path: Vec<IVec2>,
    pub color: RgbOscillator,
    /// Frames this bud has been animated
    pub frames: u32,
}

/// Result of advancing a bud by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudStep {
    Advanced { from: IVec2, to: IVec2 },
    /// Every attempt hit a known position or midpoint
    Exhausted,
}

/// Greedy margin toward `target` on one axis. Ties keep the bud still.
fn greedy_margin(current: i32, target: i32, margin: i32) -> i32 {
    [0, -margin, margin]
        .into_iter()
        .min_by_key(|m| (target - (current + m)).abs())
        .unwrap_or(0)
}

impl PatternBud {
    pub fn new(pos: IVec2, target: IVec2, color: RgbOscillator) -> Self {
        Self {
            pos,
            target,
            path: vec![pos],
            color,
            frames: 0,
        }
    }

    /// Per-axis step offset, greedy or (with probability `variance`) random
    fn draw_offset<R: Rng + ?Sized>(&self, rng: &mut R, margin: i32, variance: f64) -> IVec2 {
        let options = [-margin, 0, margin];
        let mut axis = |current: i32, target: i32| {
            if random_bool(rng, variance) {
                random_pick(rng, &options).copied().unwrap_or(0)
            } else {
                greedy_margin(current, target, margin)
            }
        };
        let x = axis(self.pos.x, self.target.x);
        let y = axis(self.pos.y, self.target.y);
        IVec2::new(x, y)
    }

    /// Whether stepping to `next` would revisit a position or cross a recorded step
    pub fn is_known(&self, next: IVec2) -> bool {
        if self.path.contains(&next) {
            return true;
        }
        // Midpoints compared in doubled coordinates
        let mid = self.pos + next;
        self.path.windows(2).any(|pair| pair[0] + pair[1] == mid)
    }

    /// Try to take one step
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &PatternConfig) -> BudStep {
        let margin = config.margin.max(1);
        let mut excluded: Vec<IVec2> = Vec::new();

        for _ in 0..=config.max_iterations {
            let mut offset = self.draw_offset(rng, margin, config.variance);
            for _ in 0..config.max_iterations {
                if !excluded.contains(&offset) {
                    break;
                }
                offset = self.draw_offset(rng, margin, config.variance);
            }

            let next = self.pos + offset;
            if self.is_known(next) {
                excluded.push(offset);
                continue;
            }

            let from = self.pos;
            self.pos = next;
            self.path.push(next);
            return BudStep::Advanced { from, to: next };
        }

        BudStep::Exhausted
    }

    /// Within two margins of the target on both axes
    pub fn reached_target(&self, margin: i32) -> bool {
        let reach = margin * 2;
        is_in_range(self.pos.x, self.target.x - reach, self.target.x + reach)
            && is_in_range(self.pos.y, self.target.y - reach, self.target.y + reach)
    }
}

/// One stroked step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trail {
    pub from: IVec2,
    pub to: IVec2,
    pub color: [u8; 3],
}

/// Draw operations of one frame, in paint order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternDraw {
    Trail(Trail),
    Hitbox(HitboxKind, IVec2),
    Fade(FadeTrigger),
}

/// Everything a frame produced
#[derive(Debug, Clone, Default)]
pub struct PatternFrame {
    pub draws: Vec<PatternDraw>,
    pub reached: usize,
    pub exhausted: usize,
}

impl PatternFrame {
    pub fn trails(&self) -> impl Iterator<Item = &Trail> {
        self.draws.iter().filter_map(|d| match d {
            PatternDraw::Trail(t) => Some(t),
            _ => None,
        })
    }
}

/// All buds of one running pattern toy
#[derive(Debug, Clone)]
pub struct PatternField {
    pub buds: Vec<PatternBud>,
    pub bounds: Bounds,
    pub config: PatternConfig,
    cursor: IVec2,
    rng: Pcg32,
}

impl PatternField {
    pub fn new(config: PatternConfig, bounds: Bounds, seed: u64) -> Self {
        let mut field = Self {
            buds: Vec::new(),
            bounds,
            config,
            cursor: IVec2::ZERO,
            rng: seeded_rng(seed),
        };
        field.respawn_all();
        field
    }

    fn respawn_all(&mut self) {
        self.buds = (0..self.config.bud_count).map(|_| self.spawn_bud()).collect();
        log::info!(
            "Spawned {} pattern buds from {}",
            self.buds.len(),
            self.config.origin.as_str()
        );
    }

    fn random_in_bounds(&mut self) -> IVec2 {
        IVec2::new(
            random_int(&mut self.rng, 0, self.bounds.width),
            random_int(&mut self.rng, 0, self.bounds.height),
        )
    }

    /// New bud at the configured origin
    pub fn spawn_bud(&mut self) -> PatternBud {
        let (pos, target) = match self.config.origin {
            OriginChoice::Center => {
                let j = self.config.center_jitter;
                let center = self.bounds.center();
                let pos = IVec2::new(
                    center.x + random_int(&mut self.rng, -j, j),
                    center.y + random_int(&mut self.rng, -j, j),
                );
                (pos, self.random_in_bounds())
            }
            OriginChoice::Full => {
                let pos = self.random_in_bounds();
                (pos, self.random_in_bounds())
            }
            OriginChoice::Cursor => {
                let j = self.config.cursor_jitter;
                let max = self.bounds.as_ivec2();
                let jitter = IVec2::new(
                    random_int(&mut self.rng, -j, j),
                    random_int(&mut self.rng, -j, j),
                );
                ((self.cursor - max + jitter).abs(), self.cursor)
            }
        };
        let color = RgbOscillator::random(&mut self.rng, self.config.color_range);
        PatternBud::new(pos, target, color)
    }

    /// Animate every bud once
    pub fn step(&mut self) -> PatternFrame {
        let mut frame = PatternFrame::default();
        let config = self.config.clone();
        let margin = config.margin.max(1);

        for i in 0..self.buds.len() {
            let bud = &mut self.buds[i];
            bud.color.step(config.color_range);
            bud.frames += 1;

            let outcome = bud.advance(&mut self.rng, &config);
            if let BudStep::Advanced { from, to } = outcome {
                frame.draws.push(PatternDraw::Trail(Trail {
                    from,
                    to,
                    color: bud.color.rgb(),
                }));
            }
            if config.hitbox.of_pos.enabled {
                frame.draws.push(PatternDraw::Hitbox(HitboxKind::OfPos, bud.pos));
            }
            if config.hitbox.of_target.enabled {
                frame.draws.push(PatternDraw::Hitbox(HitboxKind::OfTarget, bud.target));
            }

            let replace = match outcome {
                BudStep::Exhausted => {
                    log::debug!("Bud exhausted its retries after {} frames", bud.frames);
                    frame.exhausted += 1;
                    if config.fade.after_max_iteration.enabled {
                        frame.draws.push(PatternDraw::Fade(FadeTrigger::AfterMaxIteration));
                    }
                    true
                }
                BudStep::Advanced { .. } if bud.reached_target(margin) => {
                    log::debug!("Bud reached its target after {} frames", bud.frames);
                    frame.reached += 1;
                    if config.fade.after_target.enabled {
                        frame.draws.push(PatternDraw::Fade(FadeTrigger::AfterTarget));
                    }
                    true
                }
                BudStep::Advanced { .. } => false,
            };

            if replace {
                self.buds[i] = self.spawn_bud();
            }
        }

        if config.fade.after_animated.enabled {
            frame.draws.push(PatternDraw::Fade(FadeTrigger::AfterAnimated));
        }
        frame
    }

    /// Track the pointer. With the cursor origin every bud is retargeted.
    pub fn set_cursor(&mut self, cursor: IVec2) {
        self.cursor = cursor;
        if self.config.origin == OriginChoice::Cursor {
            for bud in &mut self.buds {
                bud.target = cursor;
            }
        }
    }

    /// Replace the configuration and start over with new buds
    pub fn reconfigure(&mut self, config: PatternConfig) {
        self.config = config;
        self.respawn_all();
    }

    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }
}
