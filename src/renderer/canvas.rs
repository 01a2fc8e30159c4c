//! Canvas2D backend

use glam::IVec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::Surface;
use crate::sim::{Bounds, GradientDirection};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap a canvas; `None` when no 2D context is available
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        ctx.set_font("16px monospace");
        Some(Self { canvas, ctx })
    }

    /// Match the backing store to the viewport. Clears the canvas.
    pub fn resize(&self, bounds: Bounds) {
        self.canvas.set_width(bounds.width as u32);
        self.canvas.set_height(bounds.height as u32);
        self.ctx.set_font("16px monospace");
    }
}

impl Surface for CanvasSurface {
    fn viewport(&self) -> Bounds {
        Bounds::new(self.canvas.width() as i32, self.canvas.height() as i32)
    }

    fn set_fill_color(&mut self, css: &str) {
        self.ctx.set_fill_style_str(css);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn set_stroke(&mut self, css: &str, width: f64) {
        self.ctx.set_stroke_style_str(css);
        self.ctx.set_line_width(width);
    }

    fn stroke_line(&mut self, from: IVec2, to: IVec2) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: IVec2, radius: f64) {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius, 0.0, std::f64::consts::TAU)
            .ok();
        self.ctx.fill();
    }

    fn fill_linear_gradient(&mut self, direction: GradientDirection, stops: &[(f64, String)]) {
        let Bounds { width, height } = self.viewport();
        let (w, h) = (width as f64, height as f64);
        let (x0, y0, x1, y1) = match direction {
            GradientDirection::Left => (w, 0.0, 0.0, 0.0),
            GradientDirection::Right => (0.0, 0.0, w, 0.0),
            GradientDirection::Top => (0.0, h, 0.0, 0.0),
            GradientDirection::Bottom => (0.0, 0.0, 0.0, h),
        };
        let gradient = self.ctx.create_linear_gradient(x0, y0, x1, y1);
        for (offset, css) in stops {
            if let Err(e) = gradient.add_color_stop(offset.clamp(0.0, 1.0) as f32, css) {
                log::warn!("Rejected gradient stop {}: {:?}", css, e);
            }
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.ctx.fill_text(text, x, y).ok();
    }
}
