// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Room lookup by pixel bounds and fuzzy name resolution.
//!
//! Room names in the capture dataset and room references written by a
//! language model rarely agree exactly, so [`RoomIndex::find_by_name`]
//! degrades through several matching stages before giving up. The caller is
//! told which stage matched and is expected to warn on [`MatchKind::Fuzzy`].

use crate::error::FloorplanError;
use crate::floorplan::transform::Transformer;
use crate::models::room::RoomDataset;
use crate::util::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shortest query token allowed to match as a fragment of a keyword.
const MIN_FRAGMENT_LEN: usize = 3;

/// Pixel bounding box of a room, with its center precomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl BoundingBox {
    fn from_rect(rect: Rect) -> Self {
        let center = rect.center();
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            center_x: center.x,
            center_y: center.y,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }
}

/// A room placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBounds {
    pub room_id: String,
    pub room_name: String,
    pub story: u32,
    pub pixel_vertices: Vec<Point>,
    pub bounding_box: BoundingBox,
}

/// Room-type keywords used for degraded name matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomVocabulary {
    pub keywords: Vec<String>,
    /// Abbreviation -> keyword, consulted only by the last-resort stage.
    pub aliases: BTreeMap<String, String>,
}

impl Default for RoomVocabulary {
    fn default() -> Self {
        let keywords = [
            "kitchen", "bathroom", "bedroom", "living", "dining", "office", "hallway", "closet",
            "stairway", "mudroom", "room",
        ];
        let aliases = [
            ("bdrm", "bedroom"),
            ("br", "bedroom"),
            ("ba", "bathroom"),
            ("wc", "bathroom"),
            ("hall", "hallway"),
            ("stairs", "stairway"),
            ("lr", "living"),
        ];
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            aliases: aliases
                .iter()
                .map(|(a, k)| (a.to_string(), k.to_string()))
                .collect(),
        }
    }
}

impl RoomVocabulary {
    /// A vocabulary with the given keywords and no aliases.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(|k| k.into().to_lowercase()).collect(),
            aliases: BTreeMap::new(),
        }
    }

    /// The keyword a token textually overlaps, if any.
    fn overlapping_keyword(&self, token: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|kw| {
                token.contains(kw.as_str())
                    || (token.len() >= MIN_FRAGMENT_LEN && kw.contains(token))
            })
            .map(String::as_str)
    }

    /// Keyword for a token, falling back to the alias table.
    fn resolve_keyword(&self, token: &str) -> Option<&str> {
        self.overlapping_keyword(token)
            .or_else(|| self.aliases.get(token).map(String::as_str))
    }
}

/// Which resolution stage produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Substring,
    Keyword,
    /// Last-resort guess; callers should not treat it as reliable.
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomMatch<'a> {
    pub room: &'a RoomBounds,
    pub kind: MatchKind,
}

/// Rooms keyed by lower-cased name, in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomIndex {
    entries: Vec<(String, RoomBounds)>,
}

impl RoomIndex {
    /// Transform every room and record its pixel bounds.
    ///
    /// Vertices are transformed first and bounded afterwards, so the box is
    /// always the true pixel extent of the polygon.
    pub fn build(dataset: &RoomDataset, transformer: &Transformer) -> Result<Self, FloorplanError> {
        let mut index = Self::default();
        for room in &dataset.rooms {
            let pixel_vertices = transformer.transform_polygon(&room.vertices, room.story)?;
            let rect = Rect::enclosing(&pixel_vertices).ok_or_else(|| {
                FloorplanError::TooFewVertices {
                    id: room.id.clone(),
                    count: 0,
                }
            })?;
            index.insert(RoomBounds {
                room_id: room.id.clone(),
                room_name: room.name.clone(),
                story: room.story,
                pixel_vertices,
                bounding_box: BoundingBox::from_rect(rect),
            });
        }
        log::info!("Indexed {} rooms", index.len());
        Ok(index)
    }

    fn insert(&mut self, bounds: RoomBounds) {
        let key = bounds.room_name.to_lowercase();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            log::warn!(
                "Duplicate room name '{}' (ids {} and {}), keeping the later one",
                bounds.room_name,
                slot.1.room_id,
                bounds.room_id
            );
            slot.1 = bounds;
        } else {
            self.entries.push((key, bounds));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomBounds> {
        self.entries.iter().map(|(_, bounds)| bounds)
    }

    /// Exact case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&RoomBounds> {
        let key = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, bounds)| bounds)
    }

    /// Entries with a non-blank name.
    fn named(&self) -> impl Iterator<Item = &(String, RoomBounds)> {
        self.entries.iter().filter(|(key, _)| !key.trim().is_empty())
    }

    /// Resolve a free-text room reference. The first matching stage wins:
    /// exact, substring in either direction, shared room-type keyword, and
    /// finally a fuzzy keyword/alias guess.
    pub fn find_by_name(&self, query: &str, vocabulary: &RoomVocabulary) -> Option<RoomMatch<'_>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }
        let hit = |room, kind| Some(RoomMatch { room, kind });

        if let Some(room) = self.get(&query) {
            return hit(room, MatchKind::Exact);
        }

        if let Some((_, room)) = self
            .named()
            .find(|(key, _)| key.contains(&query) || query.contains(key.as_str()))
        {
            return hit(room, MatchKind::Substring);
        }

        let tokens: Vec<&str> = query.split_whitespace().collect();
        for token in &tokens {
            if vocabulary.overlapping_keyword(token).is_none() {
                continue;
            }
            if let Some((_, room)) = self.named().find(|(key, _)| key.contains(token)) {
                return hit(room, MatchKind::Keyword);
            }
        }

        let keyword = tokens.iter().find_map(|t| vocabulary.resolve_keyword(t))?;
        self.named()
            .find(|(key, _)| key.contains(keyword))
            .and_then(|(_, room)| hit(room, MatchKind::Fuzzy))
    }

    /// Every room whose name contains `pattern`, case-insensitively.
    pub fn find_all_by_pattern(&self, pattern: &str) -> Vec<&RoomBounds> {
        let pattern = pattern.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|(key, _)| key.contains(&pattern))
            .map(|(_, bounds)| bounds)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floorplan::transform::ScaleStrategy;
    use crate::models::room::RoomPolygon;
    use approx::assert_relative_eq;

    fn square(id: &str, name: &str, x: f64, y: f64, size: f64) -> RoomPolygon {
        RoomPolygon::new(
            id,
            name,
            0,
            vec![
                Point::new(x, y),
                Point::new(x + size, y),
                Point::new(x + size, y + size),
                Point::new(x, y + size),
            ],
        )
    }

    fn index_of(rooms: Vec<RoomPolygon>) -> RoomIndex {
        let dataset = RoomDataset::new(rooms);
        let strategy = ScaleStrategy::Fixed {
            scale: 100.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        let transformer = Transformer::build(&dataset, &strategy).unwrap();
        RoomIndex::build(&dataset, &transformer).unwrap()
    }

    fn house() -> RoomIndex {
        index_of(vec![
            square("1", "Kitchen", 0.0, 0.0, 3.0),
            square("2", "Bedroom 1", 3.0, 0.0, 3.0),
            square("3", "Bathroom 2", 6.0, 0.0, 2.0),
            square("4", "Living Room", 0.0, 3.0, 4.0),
        ])
    }

    #[test]
    fn test_bounds_are_in_pixels() {
        let index = house();
        let bedroom = index.get("bedroom 1").unwrap();
        let bbox = bedroom.bounding_box;
        assert_relative_eq!(bbox.x, 300.0);
        assert_relative_eq!(bbox.width, 300.0);
        assert_relative_eq!(bbox.center_x, 450.0);
        assert_relative_eq!(bbox.center_y, 150.0);
        assert_eq!(bedroom.pixel_vertices.len(), 4);
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let index = house();
        let vocab = RoomVocabulary::default();
        let m = index.find_by_name("KITCHEN", &vocab).unwrap();
        assert_eq!(m.kind, MatchKind::Exact);
        assert_eq!(m.room.room_id, "1");
    }

    #[test]
    fn test_substring_match_both_directions() {
        let index = house();
        let vocab = RoomVocabulary::default();

        let m = index.find_by_name("the kitchen area", &vocab).unwrap();
        assert_eq!(m.kind, MatchKind::Substring);
        assert_eq!(m.room.room_name, "Kitchen");

        let m = index.find_by_name("living", &vocab).unwrap();
        assert_eq!(m.kind, MatchKind::Substring);
        assert_eq!(m.room.room_name, "Living Room");
    }

    #[test]
    fn test_keyword_match() {
        let index = house();
        let vocab = RoomVocabulary::default();
        let m = index.find_by_name("guest bathroom upstairs", &vocab).unwrap();
        assert_eq!(m.kind, MatchKind::Keyword);
        assert_eq!(m.room.room_name, "Bathroom 2");
    }

    #[test]
    fn test_abbreviation_needs_alias() {
        let index = house();

        let m = index
            .find_by_name("master bdrm", &RoomVocabulary::default())
            .unwrap();
        assert_eq!(m.kind, MatchKind::Fuzzy);
        assert_eq!(m.room.room_name, "Bedroom 1");

        let plain = RoomVocabulary::with_keywords(["bedroom", "bathroom"]);
        assert!(index.find_by_name("master bdrm", &plain).is_none());
    }

    #[test]
    fn test_custom_vocabulary() {
        let index = index_of(vec![square("1", "Pantry 1", 0.0, 0.0, 2.0)]);
        assert!(index
            .find_by_name("walk-in pantry shelf", &RoomVocabulary::default())
            .is_none());

        let vocab = RoomVocabulary::with_keywords(["pantry"]);
        let m = index.find_by_name("walk-in pantry shelf", &vocab).unwrap();
        assert_eq!(m.kind, MatchKind::Keyword);
    }

    #[test]
    fn test_unknown_room_is_not_found() {
        let index = house();
        assert!(index
            .find_by_name("garage", &RoomVocabulary::default())
            .is_none());
        assert!(index.find_by_name("   ", &RoomVocabulary::default()).is_none());
    }

    #[test]
    fn test_unnamed_room_does_not_swallow_misses() {
        let index = index_of(vec![
            square("a", "Kitchen", 0.0, 0.0, 3.0),
            square("b", "", 3.0, 0.0, 3.0),
        ]);
        let vocab = RoomVocabulary::default();
        assert!(index.find_by_name("garage", &vocab).is_none());
        assert!(index.find_by_name("spare room", &vocab).is_none());
        let found = index.find_by_name("the kitchen", &vocab).unwrap();
        assert_eq!((found.room.room_id.as_str(), found.kind), ("a", MatchKind::Substring));
    }

    #[test]
    fn test_find_all_by_pattern() {
        let index = index_of(vec![
            square("1", "Bedroom 1", 0.0, 0.0, 3.0),
            square("2", "Bedroom 2", 3.0, 0.0, 3.0),
            square("3", "Bathroom", 6.0, 0.0, 2.0),
        ]);
        let names: Vec<_> = index
            .find_all_by_pattern("BEDROOM")
            .iter()
            .map(|r| r.room_name.as_str())
            .collect();
        assert_eq!(names, vec!["Bedroom 1", "Bedroom 2"]);
        assert!(index.find_all_by_pattern("bdrm").is_empty());
    }

    #[test]
    fn test_duplicate_names_keep_position() {
        let index = index_of(vec![
            square("1", "Closet", 0.0, 0.0, 1.0),
            square("2", "Office", 1.0, 0.0, 3.0),
            square("3", "closet", 4.0, 0.0, 1.0),
        ]);
        assert_eq!(index.len(), 2);
        let first = index.rooms().next().unwrap();
        assert_eq!(first.room_id, "3");
    }
}
