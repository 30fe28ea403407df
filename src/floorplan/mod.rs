// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floorplan geometry: meter to pixel placement, room lookup and
//! conversion of model intents into annotations.

pub mod ingest;
pub mod room_index;
pub mod transform;

pub use room_index::{RoomIndex, RoomVocabulary};
pub use transform::{ScaleStrategy, Transformer};
