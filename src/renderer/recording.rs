//! Recording surface
//!
//! Keeps every call as a [`DrawCommand`]. Used by tests and the native binary.

use glam::IVec2;

use super::Surface;
use crate::sim::{Bounds, GradientDirection};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillColor(String),
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Stroke { css: String, width: f64 },
    Line { from: IVec2, to: IVec2 },
    Circle { center: IVec2, radius: f64 },
    Gradient { direction: GradientDirection, stops: Vec<(f64, String)> },
    Text { text: String, x: f64, y: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub bounds: Bounds,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// Drop the recorded commands, returning how many there were
    pub fn flush(&mut self) -> usize {
        let n = self.commands.len();
        self.commands.clear();
        n
    }

    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Bounds {
        self.bounds
    }

    fn set_fill_color(&mut self, css: &str) {
        self.commands.push(DrawCommand::FillColor(css.to_string()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.commands.push(DrawCommand::Rect { x, y, w, h });
    }

    fn set_stroke(&mut self, css: &str, width: f64) {
        self.commands.push(DrawCommand::Stroke {
            css: css.to_string(),
            width,
        });
    }

    fn stroke_line(&mut self, from: IVec2, to: IVec2) {
        self.commands.push(DrawCommand::Line { from, to });
    }

    fn fill_circle(&mut self, center: IVec2, radius: f64) {
        self.commands.push(DrawCommand::Circle { center, radius });
    }

    fn fill_linear_gradient(&mut self, direction: GradientDirection, stops: &[(f64, String)]) {
        self.commands.push(DrawCommand::Gradient {
            direction,
            stops: stops.to_vec(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
        });
    }
}
