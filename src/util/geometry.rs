// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility types.
//!
//! This module provides the 2D point type shared by room datasets and
//! annotations, an axis-aligned box, and the pan/zoom viewport that maps
//! screen coordinates to canvas coordinates.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// A 2D point (or displacement). Serialized as a compact `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Axis-aligned box in canvas pixels, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest box enclosing every point, or `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Box spanned by two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (b.x - a.x).abs(),
            (b.y - a.y).abs(),
        )
    }

    pub fn expand(self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    pub fn translate(self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Pan/zoom state of the on-screen view of the canvas.
///
/// `screen = canvas * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: Point,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub const MIN_ZOOM: f64 = 0.1;
    pub const MAX_ZOOM: f64 = 8.0;

    /// Convert a screen position to canvas coordinates.
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    /// Convert a canvas position to screen coordinates.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.pan.x,
            canvas.y * self.zoom + self.pan.y,
        )
    }

    pub fn pan_by(&mut self, screen_delta: Point) {
        self.pan = self.pan + screen_delta;
    }

    /// Zoom by `factor`, keeping the canvas point under `focus` (screen space) fixed.
    pub fn zoom_at(&mut self, focus: Point, factor: f64) {
        let anchor = self.screen_to_canvas(focus);
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan = Point::new(
            focus.x - anchor.x * self.zoom,
            focus.y - anchor.y * self.zoom,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_canvas_roundtrip() {
        let viewport = Viewport {
            pan: Point::new(120.0, -40.0),
            zoom: 1.5,
        };
        let screen = Point::new(960.0, 540.0);

        let canvas = viewport.screen_to_canvas(screen);
        let back = viewport.canvas_to_screen(canvas);

        assert!((back.x - screen.x).abs() < 0.0001);
        assert!((back.y - screen.y).abs() < 0.0001);
    }

    #[test]
    fn test_zoom_keeps_focus_fixed() {
        let mut viewport = Viewport::default();
        let focus = Point::new(300.0, 200.0);
        let before = viewport.screen_to_canvas(focus);

        viewport.zoom_at(focus, 2.0);

        let after = viewport.screen_to_canvas(focus);
        assert!((after.x - before.x).abs() < 0.0001);
        assert!((after.y - before.y).abs() < 0.0001);
        assert_eq!(viewport.zoom, 2.0);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(Point::ZERO, 1000.0);
        assert_eq!(viewport.zoom, Viewport::MAX_ZOOM);
    }

    #[test]
    fn test_rect_from_corners_normalizes() {
        let rect = Rect::from_corners(Point::new(50.0, 10.0), Point::new(20.0, 40.0));
        assert_eq!(rect, Rect::new(20.0, 10.0, 30.0, 30.0));
        assert!(rect.contains(Point::new(20.0, 40.0)));
        assert!(!rect.contains(Point::new(19.9, 20.0)));
    }

    #[test]
    fn test_point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
        let back: Point = serde_json::from_str("[3,4]").unwrap();
        assert_eq!(back, Point::new(3.0, 4.0));
    }
}
