//! Bouncing cubes
//!
//! Each cube reflects off the viewport edges on both axes and cycles its
//! fill color one unit per frame.

use glam::IVec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::color::RgbOscillator;
use super::motion::{AxisMotion, Bounds, reflect_step};
use super::random::{random_bool, random_int};
use super::seeded_rng;
use crate::settings::CubeConfig;

/// A single cube
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cube {
    pub pos: IVec2,
    pub size: IVec2,
    /// x and y motion
    pub motion: [AxisMotion; 2],
    pub color: RgbOscillator,
}

impl Cube {
    fn random_motion<R: Rng + ?Sized>(rng: &mut R, config: &CubeConfig) -> [AxisMotion; 2] {
        let mut axis = || {
            AxisMotion::new(
                random_int(rng, config.min_speed, config.max_speed),
                random_bool(rng, 0.5),
            )
        };
        [axis(), axis()]
    }

    /// Random size, position and color inside `bounds`
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds, config: &CubeConfig) -> Self {
        let size = IVec2::new(
            random_int(rng, config.min_size, config.max_size),
            random_int(rng, config.min_size, config.max_size),
        );
        let pos = IVec2::new(
            random_int(rng, 0, (bounds.width - size.x - 1).max(0)),
            random_int(rng, 0, (bounds.height - size.y - 1).max(0)),
        );
        Self {
            pos,
            size,
            motion: Self::random_motion(rng, config),
            color: RgbOscillator::random(rng, config.color_range),
        }
    }

    /// Advance one frame: color first, then both axes
    pub fn step(&mut self, bounds: Bounds, config: &CubeConfig) {
        self.color.step(config.color_range);
        for axis in 0..2 {
            self.pos[axis] = reflect_step(
                self.pos[axis],
                self.size[axis],
                bounds.axis(axis),
                &mut self.motion[axis],
            );
        }
    }

    /// Pull the cube back inside a (possibly smaller) viewport
    fn clamp_into(&mut self, bounds: Bounds) {
        for axis in 0..2 {
            let limit = (bounds.axis(axis) - self.size[axis] - 1).max(0);
            self.pos[axis] = self.pos[axis].clamp(0, limit);
        }
    }
}

/// All cubes of one running toy
#[derive(Debug, Clone)]
pub struct CubeField {
    pub cubes: Vec<Cube>,
    pub bounds: Bounds,
    pub config: CubeConfig,
    rng: Pcg32,
}

impl CubeField {
    pub fn new(config: CubeConfig, bounds: Bounds, seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let cubes = (0..config.count)
            .map(|_| Cube::random(&mut rng, bounds, &config))
            .collect();
        log::info!("Spawned {} cubes in {}x{}", config.count, bounds.width, bounds.height);
        Self {
            cubes,
            bounds,
            config,
            rng,
        }
    }

    /// Bring an element already on the page into the field, keeping its
    /// geometry and color but with random motion and direction bits
    pub fn adopt(&mut self, pos: IVec2, size: IVec2, rgb: [u8; 3]) {
        let increasing = [0; 3].map(|_| random_bool(&mut self.rng, 0.5));
        let mut cube = Cube {
            pos,
            size: size.max(IVec2::ONE),
            motion: Cube::random_motion(&mut self.rng, &self.config),
            color: RgbOscillator::from_rgb(rgb, increasing),
        };
        cube.clamp_into(self.bounds);
        self.cubes.push(cube);
    }

    pub fn step(&mut self) {
        for cube in &mut self.cubes {
            cube.step(self.bounds, &self.config);
        }
    }

    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        for cube in &mut self.cubes {
            cube.clamp_into(bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small_config(count: usize) -> CubeConfig {
        CubeConfig {
            count,
            ..CubeConfig::default()
        }
    }

    #[test]
    fn test_spawn_inside_bounds() {
        let bounds = Bounds::new(200, 100);
        let field = CubeField::new(small_config(300), bounds, 9);
        assert_eq!(field.cubes.len(), 300);
        for cube in &field.cubes {
            assert!(cube.pos.x >= 0 && cube.pos.x + cube.size.x < bounds.width);
            assert!(cube.pos.y >= 0 && cube.pos.y + cube.size.y < bounds.height);
            assert!((3..=5).contains(&cube.size.x));
            for m in cube.motion {
                assert!((1..=20).contains(&m.margin));
            }
        }
    }

    #[test]
    fn test_step_moves_and_recolors() {
        let config = CubeConfig::default();
        let mut cube = Cube {
            pos: IVec2::new(50, 50),
            size: IVec2::new(4, 4),
            motion: [AxisMotion::new(3, true), AxisMotion::new(2, false)],
            color: RgbOscillator::from_rgb([10, 10, 10], [true, false, true]),
        };
        cube.step(Bounds::default(), &config);
        assert_eq!(cube.pos, IVec2::new(53, 48));
        assert_eq!(cube.color.rgb(), [11, 9, 11]);
    }

    #[test]
    fn test_resize_clamps_cubes() {
        let mut field = CubeField::new(small_config(200), Bounds::new(800, 600), 2);
        let small = Bounds::new(100, 80);
        field.resize(small);
        for cube in &field.cubes {
            assert!(cube.pos.x + cube.size.x < small.width);
            assert!(cube.pos.y + cube.size.y < small.height);
        }
    }

    #[test]
    fn test_adopt_keeps_color_and_geometry() {
        let mut field = CubeField::new(small_config(0), Bounds::default(), 4);
        field.adopt(IVec2::new(120, 40), IVec2::new(60, 30), [200, 12, 53]);
        let cube = &field.cubes[0];
        assert_eq!(cube.pos, IVec2::new(120, 40));
        assert_eq!(cube.size, IVec2::new(60, 30));
        assert_eq!(cube.color.rgb(), [200, 12, 53]);
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = CubeField::new(small_config(20), Bounds::default(), 77);
        let b = CubeField::new(small_config(20), Bounds::default(), 77);
        for (x, y) in a.cubes.iter().zip(&b.cubes) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.color, y.color);
        }
    }

    proptest! {
        #[test]
        fn cubes_never_leave_origin_quadrant(seed in any::<u64>(), frames in 1usize..200) {
            let mut field = CubeField::new(small_config(30), Bounds::new(120, 90), seed);
            for _ in 0..frames {
                field.step();
                for cube in &field.cubes {
                    prop_assert!(cube.pos.x >= 0 && cube.pos.y >= 0);
                }
            }
        }
    }
}
