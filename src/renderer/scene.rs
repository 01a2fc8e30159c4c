//! Scene drawing for every toy

use glam::IVec2;

use super::{Surface, css_rgb, css_rgba};
use crate::settings::{FadeTrigger, HitboxKind, PatternConfig};
use crate::sim::{Bounds, CubeField, PatternDraw, PatternFrame, SnakeGame, Tracker};

pub const BACKGROUND: &str = "black";

pub fn draw_cubes<S: Surface + ?Sized>(surface: &mut S, field: &CubeField) {
    surface.clear(BACKGROUND);
    for cube in &field.cubes {
        surface.set_fill_color(&cube.color.css());
        surface.fill_rect(
            cube.pos.x as f64,
            cube.pos.y as f64,
            cube.size.x as f64,
            cube.size.y as f64,
        );
    }
}

/// Pattern frames paint over the previous ones; fades do the erasing
pub fn draw_pattern_frame<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &PatternFrame,
    config: &PatternConfig,
) {
    for draw in &frame.draws {
        match *draw {
            PatternDraw::Trail(trail) => {
                surface.set_stroke(&css_rgb(trail.color), config.line_width);
                surface.stroke_line(trail.from, trail.to);
            }
            PatternDraw::Hitbox(kind, center) => {
                let hitbox = match kind {
                    HitboxKind::OfPos => &config.hitbox.of_pos,
                    HitboxKind::OfTarget => &config.hitbox.of_target,
                };
                surface.set_fill_color(&css_rgba(hitbox.color, hitbox.strength));
                surface.fill_rect(
                    center.x as f64 - hitbox.width as f64 / 2.0,
                    center.y as f64 - hitbox.height as f64 / 2.0,
                    hitbox.width as f64,
                    hitbox.height as f64,
                );
            }
            PatternDraw::Fade(trigger) => draw_fade(surface, config, trigger),
        }
    }
}

fn draw_fade<S: Surface + ?Sized>(surface: &mut S, config: &PatternConfig, trigger: FadeTrigger) {
    let fade = config.fade.get(trigger);
    surface.clear(&css_rgba(fade.color, fade.strength));
}

/// Square of side `margin` centered on a grid point
fn grid_square<S: Surface + ?Sized>(surface: &mut S, p: IVec2, margin: i32) {
    let m = margin as f64;
    surface.fill_rect(p.x as f64 - m / 2.0, p.y as f64 - m / 2.0, m, m);
}

pub fn draw_snake<S: Surface + ?Sized>(surface: &mut S, game: &SnakeGame) {
    let margin = game.config.margin;
    surface.clear(BACKGROUND);

    surface.set_fill_color(&css_rgb(game.config.apple_color));
    grid_square(surface, game.apple, margin);

    surface.set_fill_color(&css_rgb(game.config.snake_color));
    for segment in &game.body {
        grid_square(surface, *segment, margin);
    }

    surface.set_fill_color("white");
    surface.fill_text(
        &format!("Score: {}  High score: {}  Deaths: {}", game.score, game.high_score, game.deaths),
        10.0,
        20.0,
    );
}

pub fn draw_tracker<S: Surface + ?Sized>(surface: &mut S, tracker: &Tracker) {
    let Bounds { width, height } = surface.viewport();
    surface.clear("white");

    for gradient in tracker.gradients() {
        let stops = [
            (gradient.stop_start / 100.0, "transparent".to_string()),
            (gradient.stop_end / 100.0, css_rgba([0, 0, 0], gradient.alpha)),
        ];
        surface.fill_linear_gradient(gradient.direction, &stops);
    }

    if tracker.flashlight {
        surface.set_fill_color(&css_rgba([255, 255, 255], 0.2));
        surface.fill_circle(
            IVec2::new(width / 2, height / 2),
            width.min(height) as f64 * 0.12,
        );
    }

    surface.set_fill_color("black");
    surface.fill_text(&tracker.label(), width as f64 / 2.0 - 30.0, height as f64 / 2.0);
}
