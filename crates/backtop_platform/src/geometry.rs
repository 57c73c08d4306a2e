//! Geometry in CSS pixels, viewport-relative.

use serde::{Deserialize, Serialize};

/// A point in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A bounding box as reported by the host's layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge relative to the viewport.
    pub left: f64,
    /// Top edge relative to the viewport.
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the box was actually laid out with a visible area.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }
}

/// Size of the layout viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Scroll position and extents of a scroll container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    /// Full content extent.
    pub scroll_height: f64,
    /// Visible extent.
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Content overflows the visible extent, so the container can scroll.
    pub fn can_scroll(&self) -> bool {
        self.scroll_height > self.client_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(300.0, 700.0, 44.0, 40.0);
        assert_eq!(rect.right(), 344.0);
        assert_eq!(rect.bottom(), 740.0);
        assert!(rect.has_area());
        assert!(!Rect::new(10.0, 10.0, 0.0, 40.0).has_area());
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(9.9, 9.9)));
        assert!(!rect.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_scroll_metrics_overflow() {
        let fits = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 600.0,
            client_height: 600.0,
        };
        assert!(!fits.can_scroll());

        let overflows = ScrollMetrics {
            scroll_height: 601.0,
            ..fits
        };
        assert!(overflows.can_scroll());
    }
}
