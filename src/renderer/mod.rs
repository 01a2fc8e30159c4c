//! Immediate-mode 2D rendering
//!
//! Toys draw through the [`Surface`] trait. The browser backend wraps a
//! Canvas2D context, the recording backend keeps a command list for tests
//! and headless runs.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recording;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use recording::{DrawCommand, RecordingSurface};

use glam::IVec2;

use crate::sim::{Bounds, GradientDirection};

/// Anything toys can paint on
pub trait Surface {
    /// Current drawable size
    fn viewport(&self) -> Bounds;

    /// Fill style as a CSS color
    fn set_fill_color(&mut self, css: &str);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    /// Stroke style as a CSS color plus line width
    fn set_stroke(&mut self, css: &str, width: f64);

    fn stroke_line(&mut self, from: IVec2, to: IVec2);

    fn fill_circle(&mut self, center: IVec2, radius: f64);

    /// Fill the whole viewport with a linear gradient. Stop offsets are 0.0 - 1.0.
    fn fill_linear_gradient(&mut self, direction: GradientDirection, stops: &[(f64, String)]);

    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    /// Paint the whole viewport
    fn clear(&mut self, css: &str) {
        let Bounds { width, height } = self.viewport();
        self.set_fill_color(css);
        self.fill_rect(0.0, 0.0, width as f64, height as f64);
    }
}

/// `rgb(r, g, b)`
pub fn css_rgb([r, g, b]: [u8; 3]) -> String {
    format!("rgb({}, {}, {})", r, g, b)
}

/// `rgba(r, g, b, a)`
pub fn css_rgba([r, g, b]: [u8; 3], alpha: f64) -> String {
    format!("rgba({}, {}, {}, {})", r, g, b, alpha.clamp(0.0, 1.0))
}

/// Parse a computed `rgb(r, g, b)` / `rgba(r, g, b, a)` color, ignoring alpha
pub fn parse_css_rgb(css: &str) -> Option<[u8; 3]> {
    let inner = css
        .trim()
        .strip_prefix("rgba(")
        .or_else(|| css.trim().strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>().ok());
    Some([parts.next()??, parts.next()??, parts.next()??])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_css_rgb() {
        assert_eq!(parse_css_rgb("rgb(200, 12, 53)"), Some([200, 12, 53]));
        assert_eq!(parse_css_rgb(" rgba(1,2,3, 0.5) "), Some([1, 2, 3]));
        assert_eq!(parse_css_rgb("rgb(300, 0, 0)"), None);
        assert_eq!(parse_css_rgb("transparent"), None);
    }

    #[test]
    fn test_css_helpers() {
        assert_eq!(css_rgb([0, 128, 255]), "rgb(0, 128, 255)");
        assert_eq!(css_rgba([255, 0, 0], 0.5), "rgba(255, 0, 0, 0.5)");
        assert_eq!(css_rgba([0, 0, 0], 3.0), "rgba(0, 0, 0, 1)");
    }

    #[test]
    fn test_clear_covers_viewport() {
        let mut surface = RecordingSurface::new(Bounds::new(30, 20));
        surface.clear("black");
        assert_eq!(
            surface.commands,
            vec![
                DrawCommand::FillColor("black".to_string()),
                DrawCommand::Rect { x: 0.0, y: 0.0, w: 30.0, h: 20.0 },
            ]
        );
    }
}
