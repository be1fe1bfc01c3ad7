//! Content/screen coordinates for the document viewport.
//!
//! Placeholders live in content coordinates: measured from the origin of the
//! full scrollable document, independent of the current scroll offset. The
//! host speaks screen coordinates (relative to the visible window of the
//! viewport). [`Viewport::screen_to_content`] and
//! [`Viewport::content_to_screen`] are the only conversion between the two;
//! add, drag and render all go through them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Scrollable area hosting the rendered document, as last reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub content: Size,
    pub scroll: Point,
}

impl Viewport {
    pub const fn new(content: Size) -> Self {
        Self {
            content,
            scroll: Point::new(0.0, 0.0),
        }
    }

    pub fn screen_to_content(&self, screen: Point) -> Point {
        Point::new(screen.x + self.scroll.x, screen.y + self.scroll.y)
    }

    pub fn content_to_screen(&self, content: Point) -> Point {
        Point::new(content.x - self.scroll.x, content.y - self.scroll.y)
    }

    /// Clamp a top-left corner so a box of `size` stays inside the content.
    /// Content smaller than the box pins that axis to 0.
    pub fn clamp(&self, position: Point, size: Size) -> Point {
        Point::new(
            clamp_axis(position.x, self.content.width - size.width),
            clamp_axis(position.y, self.content.height - size.height),
        )
    }

    /// Apply host-reported values. Non-finite or negative numbers are ignored,
    /// and so is an empty content size, which hosts report before layout.
    pub fn update(
        &mut self,
        content_width: Option<f64>,
        content_height: Option<f64>,
        scroll_x: Option<f64>,
        scroll_y: Option<f64>,
    ) {
        if let Some(w) = content_width.filter(|v| v.is_finite() && *v > 0.0) {
            self.content.width = w;
        }
        if let Some(h) = content_height.filter(|v| v.is_finite() && *v > 0.0) {
            self.content.height = h;
        }
        if let Some(x) = scroll_x.filter(|v| v.is_finite() && *v >= 0.0) {
            self.scroll.x = x;
        }
        if let Some(y) = scroll_y.filter(|v| v.is_finite() && *v >= 0.0) {
            self.scroll.y = y;
        }
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.min(max).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(w: f64, h: f64, sx: f64, sy: f64) -> Viewport {
        Viewport {
            content: Size::new(w, h),
            scroll: Point::new(sx, sy),
        }
    }

    #[test]
    fn transforms_are_inverse() {
        let vp = viewport(800.0, 2000.0, 0.0, 340.0);
        let screen = Point::new(120.0, 45.0);
        let content = vp.screen_to_content(screen);
        assert_eq!(content, Point::new(120.0, 385.0));
        assert_eq!(vp.content_to_screen(content), screen);
    }

    #[test]
    fn clamp_keeps_box_inside_content() {
        let vp = viewport(600.0, 800.0, 0.0, 0.0);
        let size = Size::new(150.0, 50.0);
        assert_eq!(vp.clamp(Point::new(-20.0, 900.0), size), Point::new(0.0, 750.0));
        assert_eq!(vp.clamp(Point::new(500.0, 10.0), size), Point::new(450.0, 10.0));
        assert_eq!(vp.clamp(Point::new(33.5, 12.25), size), Point::new(33.5, 12.25));
    }

    #[test]
    fn clamp_pins_to_zero_when_content_is_smaller_than_box() {
        let vp = viewport(100.0, 20.0, 0.0, 0.0);
        let clamped = vp.clamp(Point::new(40.0, 5.0), Size::new(150.0, 50.0));
        assert_eq!(clamped, Point::new(0.0, 0.0));
    }

    #[test]
    fn clamp_rejects_nan() {
        let vp = viewport(600.0, 800.0, 0.0, 0.0);
        let clamped = vp.clamp(Point::new(f64::NAN, 10.0), Size::new(10.0, 10.0));
        assert_eq!(clamped, Point::new(0.0, 10.0));
    }

    #[test]
    fn update_ignores_garbage() {
        let mut vp = viewport(600.0, 800.0, 5.0, 6.0);
        vp.update(Some(f64::INFINITY), Some(-1.0), None, Some(42.0));
        assert_eq!(vp, viewport(600.0, 800.0, 5.0, 42.0));
    }

    #[test]
    fn update_skips_unmeasured_content() {
        let mut vp = viewport(595.0, 842.0, 0.0, 0.0);
        vp.update(Some(0.0), Some(0.0), Some(0.0), None);
        assert_eq!(vp.content, Size::new(595.0, 842.0));
    }
}
