// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration file support.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. Files are read as YAML or JSON depending on their extension.

use crate::floorplan::room_index::RoomVocabulary;
use crate::floorplan::transform::{
    ScaleStrategy, REFERENCE_OFFSET_X, REFERENCE_OFFSET_Y, REFERENCE_SCALE,
};
use crate::io::serialization::Format;
use crate::models::annotation::Style;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Canvas size of the reference floorplan image, in pixels.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1779.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 1770.0;
/// Margin kept free on each side in fit mode.
pub const DEFAULT_FIT_PADDING: f64 = 40.0;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Pixel size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// How room coordinates are placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TransformMode {
    /// Constants measured against a pre-rendered image.
    Fixed {
        #[serde(default = "default_scale")]
        scale: f64,
        #[serde(default = "default_offset_x")]
        offset_x: f64,
        #[serde(default = "default_offset_y")]
        offset_y: f64,
    },
    /// Scale the drawing to fill the canvas.
    Fit {
        #[serde(default = "default_padding")]
        padding: f64,
    },
}

fn default_scale() -> f64 {
    REFERENCE_SCALE
}

fn default_offset_x() -> f64 {
    REFERENCE_OFFSET_X
}

fn default_offset_y() -> f64 {
    REFERENCE_OFFSET_Y
}

fn default_padding() -> f64 {
    DEFAULT_FIT_PADDING
}

impl Default for TransformMode {
    fn default() -> Self {
        TransformMode::Fixed {
            scale: REFERENCE_SCALE,
            offset_x: REFERENCE_OFFSET_X,
            offset_y: REFERENCE_OFFSET_Y,
        }
    }
}

impl TransformMode {
    pub fn to_strategy(&self, canvas: CanvasSize) -> ScaleStrategy {
        match *self {
            TransformMode::Fixed {
                scale,
                offset_x,
                offset_y,
            } => ScaleStrategy::Fixed {
                scale,
                offset_x,
                offset_y,
            },
            TransformMode::Fit { padding } => ScaleStrategy::FitToCanvas {
                width: canvas.width,
                height: canvas.height,
                padding,
            },
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FloorplanConfig {
    pub canvas: CanvasSize,
    pub transform: TransformMode,
    /// Room-type keywords and abbreviations for name matching.
    pub vocabulary: RoomVocabulary,
    /// Style given to newly drawn annotations.
    pub style: Style,
    pub log_level: LogLevel,
}

impl FloorplanConfig {
    /// Load a config from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&text, Format::from_path(path)?)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str, format: Format) -> Result<Self> {
        let config = match format {
            Format::Json => serde_json::from_str(text)?,
            Format::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(config)
    }

    /// Scale strategy for the configured canvas and mode.
    pub fn scale_strategy(&self) -> ScaleStrategy {
        self.transform.to_strategy(self.canvas)
    }
}
