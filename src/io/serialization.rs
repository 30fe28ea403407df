// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Room dataset import and annotation export.
//!
//! This module handles reading room datasets and writing annotation sets
//! in YAML and JSON formats, chosen by file extension.

use crate::models::annotation_set::AnnotationSet;
use crate::models::room::RoomDataset;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Serialization format, derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            other => bail!("Unsupported file extension: {:?}", other),
        }
    }
}

/// Parse a room dataset from text.
pub fn parse_rooms(text: &str, format: Format) -> Result<RoomDataset> {
    let dataset: RoomDataset = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(dataset)
}

/// Import a room dataset from a JSON or YAML file.
pub fn import_rooms(path: &Path) -> Result<RoomDataset> {
    let format = Format::from_path(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read room dataset {}", path.display()))?;
    let dataset = parse_rooms(&text, format)
        .with_context(|| format!("Failed to parse room dataset {}", path.display()))?;
    log::info!("Imported {} rooms from {}", dataset.rooms.len(), path.display());
    Ok(dataset)
}

/// Render annotations as text.
pub fn annotations_to_string(set: &AnnotationSet, format: Format) -> Result<String> {
    let text = match format {
        Format::Json => serde_json::to_string_pretty(set)?,
        Format::Yaml => serde_yaml::to_string(set)?,
    };
    Ok(text)
}

/// Export annotations to a JSON or YAML file.
pub fn export_annotations(set: &AnnotationSet, path: &Path) -> Result<()> {
    let text = annotations_to_string(set, Format::from_path(path)?)?;
    std::fs::write(path, text)?;
    log::info!("Exported {} annotations to {}", set.len(), path.display());
    Ok(())
}
