// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tool selection.
//!
//! The active tool decides how the canvas interprets pointer gestures.

use serde::{Deserialize, Serialize};

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pointer gestures pan the view; annotations are untouched.
    Pan,
    #[default]
    Select,
    Pencil,
    Circle,
    Rectangle,
    Text,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pan => "Pan",
            Tool::Select => "Select",
            Tool::Pencil => "Pencil",
            Tool::Circle => "Circle",
            Tool::Rectangle => "Rectangle",
            Tool::Text => "Text",
        }
    }

    /// One-line usage hint shown next to the toolbar.
    pub fn description(&self) -> &'static str {
        match self {
            Tool::Pan => "Drag to move around the floorplan",
            Tool::Select => "Click to select annotations, drag to move, drag handles to resize",
            Tool::Pencil => "Drag to draw a free-hand stroke",
            Tool::Circle => "Drag across the circle's diameter",
            Tool::Rectangle => "Drag from corner to corner, hold Shift for a square",
            Tool::Text => "Click to place text, press Enter to commit or Escape to discard",
        }
    }
}
