// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Room polygon datasets.
//!
//! A dataset is the externally captured floorplan: rooms as closed polygons
//! in meters, optionally accompanied by wall segments, partitioned by story.

use crate::error::FloorplanError;
use crate::util::geometry::Point;
use serde::{de, Deserialize, Deserializer, Serialize};

/// Minimum vertex count for a closed room polygon.
pub const MIN_ROOM_VERTICES: usize = 3;

/// A single room outline in real-world meter coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPolygon {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub story: u32,
    pub vertices: Vec<Point>,
}

impl RoomPolygon {
    pub fn new(id: impl Into<String>, name: impl Into<String>, story: u32, vertices: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            story,
            vertices,
        }
    }
}

/// A wall segment in meters. Walls only contribute to story bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    #[serde(default)]
    pub story: u32,
    pub start: Point,
    pub end: Point,
}

/// The room dataset as delivered by the capture pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDataset {
    pub rooms: Vec<RoomPolygon>,
    #[serde(default)]
    pub walls: Vec<WallSegment>,
}

impl RoomDataset {
    pub fn new(rooms: Vec<RoomPolygon>) -> Self {
        Self {
            rooms,
            walls: Vec::new(),
        }
    }

    /// Check the per-room invariants that deserialization cannot express.
    pub fn validate(&self) -> Result<(), FloorplanError> {
        if let Some(room) = self
            .rooms
            .iter()
            .find(|room| room.vertices.len() < MIN_ROOM_VERTICES)
        {
            return Err(FloorplanError::TooFewVertices {
                id: room.id.clone(),
                count: room.vertices.len(),
            });
        }
        Ok(())
    }

    /// Every meter-space vertex on the given story, rooms first then walls.
    pub fn story_vertices(&self, story: u32) -> impl Iterator<Item = Point> + '_ {
        let rooms = self
            .rooms
            .iter()
            .filter(move |room| room.story == story)
            .flat_map(|room| room.vertices.iter().copied());
        let walls = self
            .walls
            .iter()
            .filter(move |wall| wall.story == story)
            .flat_map(|wall| [wall.start, wall.end]);
        rooms.chain(walls)
    }

    /// Distinct stories referenced by rooms or walls, ascending.
    pub fn stories(&self) -> Vec<u32> {
        let mut stories: Vec<u32> = self
            .rooms
            .iter()
            .map(|room| room.story)
            .chain(self.walls.iter().map(|wall| wall.story))
            .collect();
        stories.sort_unstable();
        stories.dedup();
        stories
    }
}

/// Capture tools disagree on whether ids are strings or integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("room id as string or integer")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
