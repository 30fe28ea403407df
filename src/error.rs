// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for floorplan loading and annotation ingest.

use thiserror::Error;

/// Errors raised while building a transformer or room index from a dataset.
///
/// All of these are fatal for the dataset in question; the view falls back
/// to a "no floorplan available" state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FloorplanError {
    #[error("room dataset contains no coordinate data")]
    NoCoordinateData,

    #[error("no bounds recorded for story {0}")]
    MissingStoryBounds(u32),

    #[error("story {story} has degenerate bounds ({width:.3} m x {height:.3} m)")]
    DegenerateBounds { story: u32, width: f64, height: f64 },

    #[error("room '{id}' has {count} vertices, at least 3 are required")]
    TooFewVertices { id: String, count: usize },

    #[error("invalid scale {0}: must be finite and positive")]
    InvalidScale(f64),
}

/// Errors that cause a whole annotation payload batch to be skipped.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed annotation payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("annotation #{index} ({kind}) is missing required field `{field}`")]
    MissingField {
        index: usize,
        kind: &'static str,
        field: &'static str,
    },
}
