// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Conversion of model-authored annotation intents into annotations.
//!
//! Intents either reference a room by name (`room-highlight`, `room-circle`,
//! `room-label`) or carry pixel geometry directly. Room names are resolved
//! through the [`RoomIndex`]; an unresolved room drops only that intent.
//! Structural problems (bad JSON, missing coordinates) reject the batch.

use crate::error::IngestError;
use crate::floorplan::room_index::{MatchKind, RoomIndex, RoomVocabulary};
use crate::models::annotation::{
    Annotation, AnnotationKind, Origin, DEFAULT_ARROW_OFFSET, DEFAULT_CIRCLE_RADIUS, DEFAULT_COLOR,
    DEFAULT_FONT_SIZE, DEFAULT_HIGHLIGHT_SIZE, DEFAULT_OPACITY, DEFAULT_RECTANGLE_SIZE,
};
use crate::util::geometry::Point;
use serde::{de, Deserialize, Deserializer};

/// Radius of a `room-circle` when the intent does not give one.
pub const DEFAULT_ROOM_CIRCLE_RADIUS: f64 = 50.0;

/// A complete `{ "annotations": [...] }` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IntentBatch {
    #[serde(default)]
    pub annotations: Vec<AnnotationIntent>,
}

impl IntentBatch {
    pub fn from_json(text: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentKind {
    RoomHighlight,
    RoomCircle,
    RoomLabel,
    Circle,
    Rectangle,
    Highlight,
    Arrow,
    Label,
    Text,
    #[serde(other)]
    Unknown,
}

impl IntentKind {
    fn name(self) -> &'static str {
        match self {
            IntentKind::RoomHighlight => "room-highlight",
            IntentKind::RoomCircle => "room-circle",
            IntentKind::RoomLabel => "room-label",
            IntentKind::Circle => "circle",
            IntentKind::Rectangle => "rectangle",
            IntentKind::Highlight => "highlight",
            IntentKind::Arrow => "arrow",
            IntentKind::Label => "label",
            IntentKind::Text => "text",
            IntentKind::Unknown => "unknown",
        }
    }

    fn is_room_relative(self) -> bool {
        matches!(
            self,
            IntentKind::RoomHighlight | IntentKind::RoomCircle | IntentKind::RoomLabel
        )
    }
}

/// One loosely-typed annotation request. Numbers may arrive as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationIntent {
    #[serde(rename = "type")]
    pub kind: IntentKind,
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub opacity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub radius: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub fill: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub to_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub to_y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub room: Option<String>,
}

impl AnnotationIntent {
    fn color(&self) -> String {
        self.color.clone().unwrap_or_else(|| DEFAULT_COLOR.to_string())
    }

    fn opacity(&self) -> f64 {
        self.opacity.unwrap_or(DEFAULT_OPACITY)
    }

    fn machine(&self, anchor: Point, kind: AnnotationKind) -> Annotation {
        Annotation::new(Origin::Machine, anchor, self.color(), self.opacity(), kind)
    }
}

/// Convert a batch of intents into machine-authored annotations.
///
/// The batch is validated up front so that a malformed entry leaves the
/// caller's current annotations untouched. Unresolved rooms and unknown
/// intent types are skipped with a warning.
pub fn ingest(
    batch: &IntentBatch,
    index: &RoomIndex,
    vocabulary: &RoomVocabulary,
) -> Result<Vec<Annotation>, IngestError> {
    for (i, intent) in batch.annotations.iter().enumerate() {
        validate(i, intent)?;
    }

    let mut out = Vec::with_capacity(batch.annotations.len());
    for intent in &batch.annotations {
        let annotation = if intent.kind.is_room_relative() {
            room_annotation(intent, index, vocabulary)
        } else {
            pixel_annotation(intent)
        };
        out.extend(annotation);
    }

    log::info!(
        "Ingested {} of {} annotation intents",
        out.len(),
        batch.annotations.len()
    );
    Ok(out)
}

/// Parse a JSON payload and ingest it.
pub fn ingest_json(
    text: &str,
    index: &RoomIndex,
    vocabulary: &RoomVocabulary,
) -> Result<Vec<Annotation>, IngestError> {
    ingest(&IntentBatch::from_json(text)?, index, vocabulary)
}

fn validate(index: usize, intent: &AnnotationIntent) -> Result<(), IngestError> {
    let missing = |field| IngestError::MissingField {
        index,
        kind: intent.kind.name(),
        field,
    };
    match intent.kind {
        IntentKind::Unknown => Ok(()),
        kind if kind.is_room_relative() => {
            match intent.room_name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => Ok(()),
                _ => Err(missing("roomName")),
            }
        }
        _ => {
            if intent.x.is_none() {
                return Err(missing("x"));
            }
            if intent.y.is_none() {
                return Err(missing("y"));
            }
            Ok(())
        }
    }
}

fn room_annotation(
    intent: &AnnotationIntent,
    index: &RoomIndex,
    vocabulary: &RoomVocabulary,
) -> Option<Annotation> {
    let name = intent.room_name.as_deref()?;
    let Some(found) = index.find_by_name(name, vocabulary) else {
        log::warn!("Room not found for {} intent: '{}'", intent.kind.name(), name);
        return None;
    };
    if found.kind == MatchKind::Fuzzy {
        log::warn!(
            "Fuzzy room match for '{}': using '{}'",
            name,
            found.room.room_name
        );
    }

    let bbox = found.room.bounding_box;
    let annotation = match intent.kind {
        IntentKind::RoomHighlight => intent.machine(
            Point::new(bbox.x, bbox.y),
            AnnotationKind::Highlight {
                width: bbox.width,
                height: bbox.height,
                fill: intent.fill.unwrap_or(true),
            },
        ),
        IntentKind::RoomCircle => intent.machine(
            bbox.center(),
            AnnotationKind::Circle {
                radius: size_or(intent.radius, DEFAULT_ROOM_CIRCLE_RADIUS),
                fill: intent.fill.unwrap_or(false),
            },
        ),
        IntentKind::RoomLabel => intent.machine(
            bbox.center(),
            AnnotationKind::Label {
                text: intent
                    .label
                    .clone()
                    .or_else(|| intent.text.clone())
                    .unwrap_or_else(|| found.room.room_name.clone()),
                room: Some(found.room.room_name.clone()),
            },
        ),
        _ => return None,
    };
    Some(annotation)
}

/// A usable extent, or `default` when the value is missing, non-finite or
/// not positive.
fn size_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        Some(v) => {
            log::warn!("Ignoring unusable size {} in annotation intent", v);
            default
        }
        None => default,
    }
}

fn pixel_annotation(intent: &AnnotationIntent) -> Option<Annotation> {
    let (x, y) = (intent.x?, intent.y?);
    let fill = intent.fill.unwrap_or(false);
    let annotation = match intent.kind {
        IntentKind::Circle => intent.machine(
            Point::new(x, y),
            AnnotationKind::Circle {
                radius: size_or(intent.radius, DEFAULT_CIRCLE_RADIUS),
                fill,
            },
        ),
        IntentKind::Rectangle => {
            // Rectangle intents give the center; the model stores top-left.
            let width = size_or(intent.width, DEFAULT_RECTANGLE_SIZE.0);
            let height = size_or(intent.height, DEFAULT_RECTANGLE_SIZE.1);
            intent.machine(
                Point::new(x - width / 2.0, y - height / 2.0),
                AnnotationKind::Rectangle {
                    width,
                    height,
                    fill,
                },
            )
        }
        IntentKind::Highlight => intent.machine(
            Point::new(x, y),
            AnnotationKind::Highlight {
                width: size_or(intent.width, DEFAULT_HIGHLIGHT_SIZE.0),
                height: size_or(intent.height, DEFAULT_HIGHLIGHT_SIZE.1),
                fill: intent.fill.unwrap_or(true),
            },
        ),
        IntentKind::Arrow => intent.machine(
            Point::new(x, y),
            AnnotationKind::Arrow {
                to_x: intent.to_x.unwrap_or(x + DEFAULT_ARROW_OFFSET),
                to_y: intent.to_y.unwrap_or(y + DEFAULT_ARROW_OFFSET),
            },
        ),
        IntentKind::Label => intent.machine(
            Point::new(x, y),
            AnnotationKind::Label {
                text: intent
                    .label
                    .clone()
                    .or_else(|| intent.text.clone())
                    .unwrap_or_default(),
                room: intent.room.clone(),
            },
        ),
        IntentKind::Text => intent.machine(
            Point::new(x, y),
            AnnotationKind::Text {
                text: intent
                    .text
                    .clone()
                    .or_else(|| intent.label.clone())
                    .unwrap_or_default(),
                font_size: size_or(intent.font_size, DEFAULT_FONT_SIZE),
            },
        ),
        IntentKind::Unknown => {
            log::warn!("Skipping annotation intent of unknown type");
            return None;
        }
        IntentKind::RoomHighlight | IntentKind::RoomCircle | IntentKind::RoomLabel => return None,
    };
    Some(annotation)
}

/// Accept a number, a numeric string, or null.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberVisitor;

    impl<'de> de::Visitor<'de> for NumberVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a number or numeric string")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value as f64))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value as f64))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let trimmed = value.trim().trim_end_matches("px");
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| E::custom(format!("invalid number '{value}'")))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floorplan::transform::{ScaleStrategy, Transformer};
    use crate::models::room::{RoomDataset, RoomPolygon};
    use approx::assert_relative_eq;

    fn index() -> RoomIndex {
        let rooms = vec![
            RoomPolygon::new(
                "k",
                "Kitchen",
                0,
                vec![
                    Point::new(0.0, 0.0),
                    Point::new(4.0, 0.0),
                    Point::new(4.0, 3.0),
                    Point::new(0.0, 3.0),
                ],
            ),
            RoomPolygon::new(
                "b",
                "Bedroom 1",
                0,
                vec![
                    Point::new(4.0, 0.0),
                    Point::new(7.0, 0.0),
                    Point::new(7.0, 3.0),
                    Point::new(4.0, 3.0),
                ],
            ),
        ];
        let dataset = RoomDataset::new(rooms);
        let strategy = ScaleStrategy::Fixed {
            scale: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        let transformer = Transformer::build(&dataset, &strategy).unwrap();
        RoomIndex::build(&dataset, &transformer).unwrap()
    }

    fn run(json: &str) -> Result<Vec<Annotation>, IngestError> {
        ingest_json(json, &index(), &RoomVocabulary::default())
    }

    #[test]
    fn test_room_intents_use_bounding_box() {
        let out = run(r##"{"annotations": [
            {"type": "room-highlight", "roomName": "kitchen", "color": "#00ff00"},
            {"type": "room-circle", "roomName": "Bedroom 1"},
            {"type": "room-label", "roomName": "bedroom 1", "label": "2"}
        ]}"##)
        .unwrap();

        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|a| a.origin == Origin::Machine));

        let hl = &out[0];
        assert_eq!((hl.x, hl.y), (0.0, 0.0));
        assert_eq!(hl.color, "#00ff00");
        assert_relative_eq!(hl.opacity, DEFAULT_OPACITY);
        assert!(matches!(hl.kind, AnnotationKind::Highlight { width, height, .. } if width == 400.0 && height == 300.0));

        let circle = &out[1];
        assert_eq!((circle.x, circle.y), (550.0, 150.0));
        assert!(matches!(circle.kind, AnnotationKind::Circle { radius, .. } if radius == 50.0));

        match &out[2].kind {
            AnnotationKind::Label { text, room } => {
                assert_eq!(text, "2");
                assert_eq!(room.as_deref(), Some("Bedroom 1"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_room_drops_only_that_intent() {
        let out = run(r#"{"annotations": [
            {"type": "room-highlight", "roomName": "Garage"},
            {"type": "room-circle", "roomName": "kitchen", "radius": "75"}
        ]}"#)
        .unwrap();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].kind, AnnotationKind::Circle { radius, .. } if radius == 75.0));
    }

    #[test]
    fn test_pixel_intents_fill_defaults() {
        let out = run(r#"{"annotations": [
            {"type": "circle", "x": "100", "y": 120},
            {"type": "rectangle", "x": 200, "y": 200},
            {"type": "highlight", "x": 10, "y": 20, "width": 30},
            {"type": "arrow", "x": 5, "y": 6},
            {"type": "text", "x": 1, "y": 2, "text": "Ramp too steep"},
            {"type": "label", "x": 1, "y": 2, "label": "A", "room": "Kitchen", "opacity": 0.9}
        ]}"#)
        .unwrap();
        assert_eq!(out.len(), 6);

        assert!(matches!(out[0].kind, AnnotationKind::Circle { radius, .. } if radius == DEFAULT_CIRCLE_RADIUS));
        assert_eq!((out[0].x, out[0].y), (100.0, 120.0));

        // Centered at (200, 200), stored from its top-left corner.
        assert_eq!((out[1].x, out[1].y), (125.0, 125.0));

        assert!(matches!(out[2].kind, AnnotationKind::Highlight { width, height, .. } if width == 30.0 && height == 120.0));
        assert!(matches!(out[3].kind, AnnotationKind::Arrow { to_x, to_y } if to_x == 105.0 && to_y == 106.0));
        assert!(matches!(&out[4].kind, AnnotationKind::Text { text, font_size } if text == "Ramp too steep" && *font_size == 16.0));
        assert_relative_eq!(out[5].opacity, 0.9);
    }

    #[test]
    fn test_unusable_sizes_fall_back_to_defaults() {
        let out = run(r#"{"annotations": [
            {"type": "circle", "x": 10, "y": 10, "radius": -40},
            {"type": "highlight", "x": 0, "y": 0, "width": -5, "height": 0},
            {"type": "rectangle", "x": 100, "y": 100, "width": "0px", "height": 40},
            {"type": "text", "x": 1, "y": 2, "text": "Step", "fontSize": -3},
            {"type": "room-circle", "roomName": "kitchen", "radius": 0}
        ]}"#)
        .unwrap();
        assert_eq!(out.len(), 5);

        assert!(matches!(out[0].kind, AnnotationKind::Circle { radius, .. } if radius == DEFAULT_CIRCLE_RADIUS));
        assert!(matches!(out[1].kind, AnnotationKind::Highlight { width, height, .. }
            if (width, height) == DEFAULT_HIGHLIGHT_SIZE));
        assert!(matches!(out[2].kind, AnnotationKind::Rectangle { width, height, .. }
            if width == DEFAULT_RECTANGLE_SIZE.0 && height == 40.0));
        assert_eq!((out[2].x, out[2].y), (25.0, 80.0));
        assert!(matches!(&out[3].kind, AnnotationKind::Text { font_size, .. } if *font_size == DEFAULT_FONT_SIZE));
        assert!(matches!(out[4].kind, AnnotationKind::Circle { radius, .. } if radius == DEFAULT_ROOM_CIRCLE_RADIUS));
    }

    #[test]
    fn test_missing_coordinates_reject_batch() {
        let err = run(r#"{"annotations": [
            {"type": "room-highlight", "roomName": "kitchen"},
            {"type": "circle", "x": 10}
        ]}"#)
        .unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingField {
                index: 1,
                field: "y",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_room_name_rejects_batch() {
        let err = run(r#"{"annotations": [{"type": "room-label", "roomName": "  "}]}"#).unwrap_err();
        assert!(matches!(err, IngestError::MissingField { field: "roomName", .. }));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(run("{not json"), Err(IngestError::Json(_))));
        assert!(matches!(
            run(r#"{"annotations": [{"type": "circle", "x": "ten", "y": 1}]}"#),
            Err(IngestError::Json(_))
        ));
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        let out = run(r#"{"annotations": [
            {"type": "sparkle", "x": 1, "y": 1},
            {"type": "circle", "x": 1, "y": 1}
        ]}"#)
        .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_ids_are_fresh() {
        let json = r#"{"annotations": [{"type": "room-highlight", "roomName": "kitchen"}]}"#;
        let first = run(json).unwrap();
        let second = run(json).unwrap();
        assert_ne!(first[0].id, second[0].id);
    }
}
