// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floormark - annotated floorplans
//!
//! Places room polygons measured in meters onto a pixel canvas, resolves
//! loosely phrased room names, turns model-produced annotation intents into
//! vector annotations and lets a user draw, move, resize and edit their own
//! annotations on top.

pub mod app;
pub mod config;
pub mod error;
pub mod floorplan;
pub mod io;
pub mod models;
pub mod ui;
pub mod util;

pub use app::{Floorplan, FloorplanView};
pub use config::FloorplanConfig;
pub use error::{FloorplanError, IngestError};
pub use floorplan::{RoomIndex, RoomVocabulary, ScaleStrategy, Transformer};
pub use models::annotation::{Annotation, AnnotationKind, Origin, Style};
pub use models::annotation_set::AnnotationSet;
pub use models::room::{RoomDataset, RoomPolygon};
pub use util::geometry::{Point, Rect, Viewport};
