//! # Planar Geometry
//!
//! Points and axis-aligned boxes shared by every stage.

use serde::{Deserialize, Serialize};

/// A point (or vector) in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point2 {
    /// Creates a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance_sq(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Returns true when both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum X.
    pub min_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl Bounds {
    /// Creates a box from its corner coordinates.
    #[inline]
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Width of the box (may be zero or negative for degenerate input).
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box (may be zero or negative for degenerate input).
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when the box encloses a positive, finite area.
    #[inline]
    #[must_use]
    pub fn has_area(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
    }

    /// Center of the box.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Half the length of the diagonal.
    #[inline]
    #[must_use]
    pub fn half_diagonal(&self) -> f64 {
        self.width().hypot(self.height()) * 0.5
    }

    /// Inclusive containment test.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Maps a point to `[0, 1]` per axis.
    ///
    /// A zero-extent axis maps to its center (0.5).
    #[must_use]
    pub fn normalize(&self, p: Point2) -> (f64, f64) {
        let axis = |v: f64, min: f64, extent: f64| {
            if extent > 0.0 { (v - min) / extent } else { 0.5 }
        };
        (
            axis(p.x, self.min_x, self.width()),
            axis(p.y, self.min_y, self.height()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_metrics() {
        let bounds = Bounds::new(0.0, 0.0, 60.0, 80.0);
        assert_eq!(bounds.width(), 60.0);
        assert_eq!(bounds.height(), 80.0);
        assert_eq!(bounds.center(), Point2::new(30.0, 40.0));
        assert!((bounds.half_diagonal() - 50.0).abs() < 1e-12);
        assert!(bounds.has_area());
    }

    #[test]
    fn test_degenerate_bounds() {
        let flat = Bounds::new(5.0, 5.0, 5.0, 10.0);
        assert!(!flat.has_area());
        assert_eq!(flat.normalize(Point2::new(5.0, 10.0)), (0.5, 1.0));
    }

    #[test]
    fn test_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance_sq(b), 25.0);
        assert_eq!(a.distance(b), 5.0);
    }
}
