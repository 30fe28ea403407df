// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the vector annotations drawn over the floorplan
//! canvas, together with the pure geometric operations the editor needs:
//! hit-testing, resize handles, resizing and rigid moves. All coordinates
//! are canvas pixels.

use crate::util::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use uuid::Uuid;

/// Session-unique annotation identifier.
pub type AnnotationId = Uuid;

pub const DEFAULT_OPACITY: f64 = 0.6;
pub const DEFAULT_COLOR: &str = "#ef4444";
pub const DEFAULT_CIRCLE_RADIUS: f64 = 60.0;
pub const DEFAULT_RECTANGLE_SIZE: (f64, f64) = (150.0, 150.0);
pub const DEFAULT_HIGHLIGHT_SIZE: (f64, f64) = (150.0, 120.0);
pub const DEFAULT_ARROW_OFFSET: f64 = 100.0;
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Labels are drawn inside a filled circle of this radius.
pub const LABEL_RADIUS: f64 = 20.0;
/// Padding added around a pencil stroke's raw point extent.
pub const PENCIL_BOUNDS_PADDING: f64 = 5.0;
/// Hit radius (circle) or half-extent (corner box) of a resize handle.
pub const HANDLE_HIT_SIZE: f64 = 8.0;
pub const MIN_CIRCLE_RADIUS: f64 = 10.0;
pub const MIN_BOX_SIZE: f64 = 20.0;

/// Who created an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Drawn by a person with the editor.
    User,
    /// Produced by ingesting model output; replaced wholesale on re-ingest.
    Machine,
}

/// Resize handle of a selected annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Circle radius handle at `(x + radius, y)`.
    Radius,
    Nw,
    Ne,
    Sw,
    Se,
}

/// Kind-specific annotation geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Free-hand stroke. `bounds` is the padded extent of `points`.
    Pencil { points: Vec<Point>, bounds: Rect },
    /// Anchored at the center.
    Circle { radius: f64, fill: bool },
    /// Anchored at the top-left corner.
    Rectangle { width: f64, height: f64, fill: bool },
    /// Anchored at the top-left corner.
    Highlight { width: f64, height: f64, fill: bool },
    Arrow {
        #[serde(rename = "toX")]
        to_x: f64,
        #[serde(rename = "toY")]
        to_y: f64,
    },
    /// Short marker text inside a [`LABEL_RADIUS`] circle centered on the anchor.
    Label {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
    },
    /// Free text whose top-left corner is the anchor.
    Text {
        text: String,
        #[serde(rename = "fontSize")]
        font_size: f64,
    },
}

impl AnnotationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Pencil { .. } => "pencil",
            AnnotationKind::Circle { .. } => "circle",
            AnnotationKind::Rectangle { .. } => "rectangle",
            AnnotationKind::Highlight { .. } => "highlight",
            AnnotationKind::Arrow { .. } => "arrow",
            AnnotationKind::Label { .. } => "label",
            AnnotationKind::Text { .. } => "text",
        }
    }
}

/// Source of text extents for hit-testing text annotations.
pub trait TextMeasure {
    /// Width and height of `text` at `font_size`, in canvas pixels.
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64);
}

/// Character-count approximation of text extents.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextMeasure;

impl TextMeasure for HeuristicTextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> (f64, f64) {
        (
            text.chars().count() as f64 * font_size * 0.6,
            font_size * 1.2,
        )
    }
}

/// Visual style applied to new annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub color: String,
    pub opacity: f64,
    pub fill: bool,
    pub font_size: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            opacity: DEFAULT_OPACITY,
            fill: false,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// A vector annotation on the floorplan canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub origin: Origin,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub opacity: f64,
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

impl Annotation {
    /// Create an annotation with a fresh id.
    pub fn new(origin: Origin, anchor: Point, color: impl Into<String>, opacity: f64, kind: AnnotationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            x: anchor.x,
            y: anchor.y,
            color: color.into(),
            opacity: opacity.clamp(0.0, 1.0),
            kind,
        }
    }

    /// A pencil stroke through `points`; `None` if there are no points.
    pub fn pencil(origin: Origin, points: Vec<Point>, style: &Style) -> Option<Self> {
        let bounds = Rect::enclosing(&points)?.expand(PENCIL_BOUNDS_PADDING);
        Some(Self::new(
            origin,
            Point::new(bounds.x, bounds.y),
            style.color.clone(),
            style.opacity,
            AnnotationKind::Pencil { points, bounds },
        ))
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_machine(&self) -> bool {
        self.origin == Origin::Machine
    }

    /// Compact SVG path for pencil strokes (`M x y L x y ...`).
    pub fn path_data(&self) -> Option<String> {
        let AnnotationKind::Pencil { points, .. } = &self.kind else {
            return None;
        };
        let mut path = String::new();
        for (i, p) in points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                path.push(' ');
            }
            let _ = write!(path, "{cmd}{} {}", p.x, p.y);
        }
        Some(path)
    }

    /// Selection box used by hit-testing, or `None` for kinds that are
    /// never hit interactively (arrows and labels).
    pub fn hit_bounds(&self, measure: &dyn TextMeasure) -> Option<Rect> {
        match &self.kind {
            AnnotationKind::Pencil { bounds, .. } => Some(*bounds),
            AnnotationKind::Circle { radius, .. } => Some(Rect::new(
                self.x - radius,
                self.y - radius,
                radius * 2.0,
                radius * 2.0,
            )),
            AnnotationKind::Rectangle { width, height, .. }
            | AnnotationKind::Highlight { width, height, .. } => {
                Some(Rect::new(self.x, self.y, *width, *height))
            }
            AnnotationKind::Text { text, font_size } => {
                let (w, h) = measure.measure(text, *font_size);
                Some(Rect::new(self.x, self.y, w, h))
            }
            AnnotationKind::Arrow { .. } | AnnotationKind::Label { .. } => None,
        }
    }

    /// Whether `point` lies on this annotation.
    pub fn contains(&self, point: Point, measure: &dyn TextMeasure) -> bool {
        match &self.kind {
            AnnotationKind::Circle { radius, .. } => self.anchor().distance(point) <= *radius,
            _ => self
                .hit_bounds(measure)
                .is_some_and(|bounds| bounds.contains(point)),
        }
    }

    /// Resize handles exposed while selected.
    pub fn handles(&self) -> Vec<(Handle, Point)> {
        match &self.kind {
            AnnotationKind::Circle { radius, .. } => {
                vec![(Handle::Radius, Point::new(self.x + radius, self.y))]
            }
            AnnotationKind::Rectangle { width, height, .. }
            | AnnotationKind::Highlight { width, height, .. } => vec![
                (Handle::Nw, Point::new(self.x, self.y)),
                (Handle::Ne, Point::new(self.x + width, self.y)),
                (Handle::Sw, Point::new(self.x, self.y + height)),
                (Handle::Se, Point::new(self.x + width, self.y + height)),
            ],
            _ => Vec::new(),
        }
    }

    /// The resize handle under `point`, if any.
    pub fn handle_at(&self, point: Point) -> Option<Handle> {
        let radial = matches!(self.kind, AnnotationKind::Circle { .. });
        self.handles()
            .into_iter()
            .find(|(_, pos)| {
                if radial {
                    pos.distance(point) <= HANDLE_HIT_SIZE
                } else {
                    (pos.x - point.x).abs() <= HANDLE_HIT_SIZE
                        && (pos.y - point.y).abs() <= HANDLE_HIT_SIZE
                }
            })
            .map(|(handle, _)| handle)
    }

    /// Resize by dragging `handle` by `delta`.
    ///
    /// Corner handles keep the opposite corner fixed; sizes never drop below
    /// [`MIN_BOX_SIZE`] and radii never below [`MIN_CIRCLE_RADIUS`]. Handles
    /// that do not belong to this kind leave it unchanged.
    pub fn resize(&mut self, handle: Handle, delta: Point) {
        match (&mut self.kind, handle) {
            (AnnotationKind::Circle { radius, .. }, Handle::Radius) => {
                *radius = (*radius + delta.x).max(MIN_CIRCLE_RADIUS);
            }
            (
                AnnotationKind::Rectangle { width, height, .. }
                | AnnotationKind::Highlight { width, height, .. },
                Handle::Nw | Handle::Ne | Handle::Sw | Handle::Se,
            ) => {
                let right = self.x + *width;
                let bottom = self.y + *height;
                if matches!(handle, Handle::Nw | Handle::Sw) {
                    *width = (*width - delta.x).max(MIN_BOX_SIZE);
                    self.x = right - *width;
                } else {
                    *width = (*width + delta.x).max(MIN_BOX_SIZE);
                }
                if matches!(handle, Handle::Nw | Handle::Ne) {
                    *height = (*height - delta.y).max(MIN_BOX_SIZE);
                    self.y = bottom - *height;
                } else {
                    *height = (*height + delta.y).max(MIN_BOX_SIZE);
                }
            }
            _ => {}
        }
    }

    pub fn resized(&self, handle: Handle, delta: Point) -> Self {
        let mut next = self.clone();
        next.resize(handle, delta);
        next
    }

    /// Translate the whole annotation as a rigid body.
    pub fn translate(&mut self, delta: Point) {
        self.x += delta.x;
        self.y += delta.y;
        match &mut self.kind {
            AnnotationKind::Pencil { points, bounds } => {
                for p in points.iter_mut() {
                    *p = *p + delta;
                }
                *bounds = bounds.translate(delta);
            }
            AnnotationKind::Arrow { to_x, to_y } => {
                *to_x += delta.x;
                *to_y += delta.y;
            }
            _ => {}
        }
    }

    pub fn moved(&self, delta: Point) -> Self {
        let mut next = self.clone();
        next.translate(delta);
        next
    }
}
