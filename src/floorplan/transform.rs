// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Meter-to-pixel coordinate transformation.
//!
//! Stories are laid out side by side on the canvas: the lowest story starts
//! at the origin offset and each following story is placed immediately to the
//! right of the previous one. All stories share a single vertical origin (the
//! global minimum Y) so that floors line up when drawn next to each other.
//!
//! Two construction strategies exist. [`ScaleStrategy::Fixed`] aligns with a
//! pre-rendered reference image using measured constants, while
//! [`ScaleStrategy::FitToCanvas`] derives the scale so a fresh rendering fits
//! the target canvas.

use crate::error::FloorplanError;
use crate::models::room::RoomDataset;
use crate::util::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pixels per meter measured against the 1779x1770 reference floorplan image.
pub const REFERENCE_SCALE: f64 = 96.5;
/// Horizontal pixel offset of the reference image's drawing origin.
pub const REFERENCE_OFFSET_X: f64 = 62.0;
/// Vertical pixel offset of the reference image's drawing origin.
pub const REFERENCE_OFFSET_Y: f64 = 58.0;

/// Meter-space extent of one story.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoryBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl StoryBounds {
    fn from_points(mut points: impl Iterator<Item = Point>) -> Option<Self> {
        let first = points.next()?;
        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for p in points {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
}

/// How the uniform scale and origin offsets are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScaleStrategy {
    /// Measured constants aligned to a pre-rendered image.
    Fixed {
        scale: f64,
        offset_x: f64,
        offset_y: f64,
    },
    /// Derive the scale so the drawing fits the canvas inside `padding`.
    FitToCanvas {
        width: f64,
        height: f64,
        padding: f64,
    },
}

impl ScaleStrategy {
    /// Constants for the reference floorplan image.
    pub fn reference() -> Self {
        ScaleStrategy::Fixed {
            scale: REFERENCE_SCALE,
            offset_x: REFERENCE_OFFSET_X,
            offset_y: REFERENCE_OFFSET_Y,
        }
    }
}

impl Default for ScaleStrategy {
    fn default() -> Self {
        Self::reference()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StoryPlacement {
    bounds: StoryBounds,
    /// Width of every lower story, in meters.
    prior_width: f64,
}

/// Immutable meter-to-pixel mapping for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformer {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    global_min_y: f64,
    global_max_y: f64,
    stories: BTreeMap<u32, StoryPlacement>,
}

impl Transformer {
    /// Measure per-story bounds and derive the placement for `strategy`.
    pub fn build(dataset: &RoomDataset, strategy: &ScaleStrategy) -> Result<Self, FloorplanError> {
        dataset.validate()?;

        let mut stories = BTreeMap::new();
        let mut prior_width = 0.0;
        for story in dataset.stories() {
            let Some(bounds) = StoryBounds::from_points(dataset.story_vertices(story)) else {
                continue;
            };
            if bounds.is_degenerate() {
                return Err(FloorplanError::DegenerateBounds {
                    story,
                    width: bounds.width(),
                    height: bounds.height(),
                });
            }
            stories.insert(story, StoryPlacement { bounds, prior_width });
            prior_width += bounds.width();
        }

        if stories.is_empty() {
            return Err(FloorplanError::NoCoordinateData);
        }

        let global_min_y = stories
            .values()
            .map(|p| p.bounds.min_y)
            .fold(f64::INFINITY, f64::min);
        let global_max_y = stories
            .values()
            .map(|p| p.bounds.max_y)
            .fold(f64::NEG_INFINITY, f64::max);
        let total_width = prior_width;
        let total_height = global_max_y - global_min_y;

        let (scale, offset_x, offset_y) = match *strategy {
            ScaleStrategy::Fixed {
                scale,
                offset_x,
                offset_y,
            } => (scale, offset_x, offset_y),
            ScaleStrategy::FitToCanvas {
                width,
                height,
                padding,
            } => {
                let available_w = width - padding * 2.0;
                let available_h = height - padding * 2.0;
                let scale = (available_w / total_width).min(available_h / total_height);
                (
                    scale,
                    padding + (available_w - total_width * scale) / 2.0,
                    padding + (available_h - total_height * scale) / 2.0,
                )
            }
        };

        if !(scale.is_finite() && scale > 0.0) {
            return Err(FloorplanError::InvalidScale(scale));
        }

        log::debug!(
            "Built transformer: {} stories, scale {:.3} px/m, offset ({:.1}, {:.1})",
            stories.len(),
            scale,
            offset_x,
            offset_y
        );

        Ok(Self {
            scale,
            offset_x,
            offset_y,
            global_min_y,
            global_max_y,
            stories,
        })
    }

    /// Map a meter-space point on `story` to canvas pixels.
    pub fn transform(&self, x: f64, y: f64, story: u32) -> Result<Point, FloorplanError> {
        let placement = self
            .stories
            .get(&story)
            .ok_or(FloorplanError::MissingStoryBounds(story))?;
        Ok(Point::new(
            self.offset_x + (placement.prior_width + x - placement.bounds.min_x) * self.scale,
            self.offset_y + (y - self.global_min_y) * self.scale,
        ))
    }

    pub fn transform_polygon(&self, vertices: &[Point], story: u32) -> Result<Vec<Point>, FloorplanError> {
        vertices
            .iter()
            .map(|v| self.transform(v.x, v.y, story))
            .collect()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn story_bounds(&self, story: u32) -> Option<StoryBounds> {
        self.stories.get(&story).map(|p| p.bounds)
    }

    /// Stories with measured bounds, ascending.
    pub fn stories(&self) -> impl Iterator<Item = u32> + '_ {
        self.stories.keys().copied()
    }

    /// Pixel extent of the whole drawing, excluding offsets.
    pub fn drawing_size(&self) -> (f64, f64) {
        let width: f64 = self.stories.values().map(|p| p.bounds.width()).sum();
        (
            width * self.scale,
            (self.global_max_y - self.global_min_y) * self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::room::RoomPolygon;
    use approx::assert_relative_eq;

    fn rect_room(id: &str, story: u32, min: (f64, f64), max: (f64, f64)) -> RoomPolygon {
        RoomPolygon::new(
            id,
            id,
            story,
            vec![
                Point::new(min.0, min.1),
                Point::new(max.0, min.1),
                Point::new(max.0, max.1),
                Point::new(min.0, max.1),
            ],
        )
    }

    fn two_story() -> RoomDataset {
        RoomDataset::new(vec![
            rect_room("a", 0, (0.0, 0.0), (4.0, 3.0)),
            rect_room("b", 1, (0.0, 1.0), (5.0, 4.0)),
        ])
    }

    fn unit_scale() -> ScaleStrategy {
        ScaleStrategy::Fixed {
            scale: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    #[test]
    fn test_second_story_placed_right_of_first() {
        let t = Transformer::build(&two_story(), &unit_scale()).unwrap();

        let p = t.transform(0.0, 1.0, 1).unwrap();
        assert_relative_eq!(p.x, 400.0);
        assert_relative_eq!(p.y, 100.0);

        let origin = t.transform(0.0, 0.0, 0).unwrap();
        assert_relative_eq!(origin.x, 0.0);
        assert_relative_eq!(origin.y, 0.0);
    }

    #[test]
    fn test_offsets_are_applied() {
        let strategy = ScaleStrategy::Fixed {
            scale: 10.0,
            offset_x: 50.0,
            offset_y: 20.0,
        };
        let t = Transformer::build(&two_story(), &strategy).unwrap();
        let p = t.transform(4.0, 3.0, 0).unwrap();
        assert_relative_eq!(p.x, 90.0);
        assert_relative_eq!(p.y, 50.0);
    }

    #[test]
    fn test_missing_story_is_an_error() {
        let t = Transformer::build(&two_story(), &unit_scale()).unwrap();
        assert_eq!(
            t.transform(0.0, 0.0, 3),
            Err(FloorplanError::MissingStoryBounds(3))
        );
    }

    #[test]
    fn test_empty_dataset_has_no_coordinate_data() {
        let result = Transformer::build(&RoomDataset::default(), &unit_scale());
        assert_eq!(result, Err(FloorplanError::NoCoordinateData));
    }

    #[test]
    fn test_degenerate_story_is_rejected() {
        let dataset = RoomDataset::new(vec![RoomPolygon::new(
            "flat",
            "Flat",
            0,
            vec![Point::new(0.0, 1.0), Point::new(2.0, 1.0), Point::new(3.0, 1.0)],
        )]);
        let result = Transformer::build(&dataset, &unit_scale());
        assert!(matches!(
            result,
            Err(FloorplanError::DegenerateBounds { story: 0, .. })
        ));
    }

    #[test]
    fn test_fit_to_canvas_fits_and_centers() {
        let strategy = ScaleStrategy::FitToCanvas {
            width: 1000.0,
            height: 1000.0,
            padding: 50.0,
        };
        let t = Transformer::build(&two_story(), &strategy).unwrap();

        // 9 m total width, 4 m total height inside 900x900 px.
        assert_relative_eq!(t.scale(), 100.0);
        let (w, h) = t.drawing_size();
        assert_relative_eq!(w, 900.0);
        assert_relative_eq!(h, 400.0);

        let top_left = t.transform(0.0, 0.0, 0).unwrap();
        assert_relative_eq!(top_left.x, 50.0);
        assert_relative_eq!(top_left.y, 50.0 + 250.0);
    }

    #[test]
    fn test_fit_to_canvas_rejects_tiny_canvas() {
        let strategy = ScaleStrategy::FitToCanvas {
            width: 40.0,
            height: 40.0,
            padding: 30.0,
        };
        assert!(matches!(
            Transformer::build(&two_story(), &strategy),
            Err(FloorplanError::InvalidScale(_))
        ));
    }

    #[test]
    fn test_story_gap_in_numbering_is_packed() {
        let dataset = RoomDataset::new(vec![
            rect_room("a", 0, (0.0, 0.0), (4.0, 3.0)),
            rect_room("c", 2, (1.0, 0.0), (3.0, 3.0)),
        ]);
        let t = Transformer::build(&dataset, &unit_scale()).unwrap();
        assert_eq!(t.stories().collect::<Vec<_>>(), vec![0, 2]);
        assert_relative_eq!(t.transform(1.0, 0.0, 2).unwrap().x, 400.0);
        assert!(t.story_bounds(1).is_none());
    }
}
