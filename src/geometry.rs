//! Rectangle geometry for the canvas coordinate space
//!
//! All coordinates are canvas pixels with the origin at the top-left corner
//! of the scrollable surface; `y` grows downward.

use serde::{Deserialize, Serialize};

/// A 2D point in canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, the `{x, y, w, h}` layout record of a widget
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Left edge x-coordinate
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Top edge y-coordinate
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.h / 2.0
    }

    /// Center point of the rectangle
    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }

    /// Top-left corner
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same size, moved to a new top-left corner
    pub fn with_origin(&self, x: f64, y: f64) -> Rect {
        Rect::new(x, y, self.w, self.h)
    }

    /// Same origin, new size
    pub fn with_size(&self, w: f64, h: f64) -> Rect {
        Rect::new(self.x, self.y, w, h)
    }

    /// Moved by a delta
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Strict interior overlap; rectangles that only share an edge do not overlap
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Overlap test after pulling every edge of `other` inward by `inset`.
    ///
    /// Two cards that merely touch or overlap by a sliver do not pass; they
    /// must share more than `inset` pixels on both axes.
    pub fn overlaps_inset(&self, other: &Rect, inset: f64) -> bool {
        self.left() < other.right() - inset
            && self.right() > other.left() + inset
            && self.top() < other.bottom() - inset
            && self.bottom() > other.top() + inset
    }

    /// Whether both dimensions are within `tolerance` of another rectangle's
    pub fn similar_size(&self, other: &Rect, tolerance: f64) -> bool {
        (self.w - other.w).abs() <= tolerance && (self.h - other.h).abs() <= tolerance
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Origin clamped into the non-negative quadrant
    pub fn clamp_non_negative(&self) -> Rect {
        Rect::new(self.x.max(0.0), self.y.max(0.0), self.w, self.h)
    }

    /// All four components rounded to the grid
    pub fn snapped(&self, step: f64) -> Rect {
        Rect::new(
            snap(self.x, step),
            snap(self.y, step),
            snap(self.w, step),
            snap(self.h, step),
        )
    }
}

/// Round a value to the nearest multiple of `step`.
///
/// Halves round away from zero. A non-positive step leaves the value alone.
pub fn snap(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}
