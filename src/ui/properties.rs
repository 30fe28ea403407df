// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation property edits.
//!
//! Style changes requested from a properties panel for the selected
//! annotation: color, opacity, fill, font size and text.

use crate::models::annotation::{Annotation, AnnotationKind};

/// Smallest font size accepted for text annotations.
pub const MIN_FONT_SIZE: f64 = 6.0;

/// A single property change.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    Color(String),
    Opacity(f64),
    Fill(bool),
    FontSize(f64),
    Text(String),
}

/// Apply an edit in place. Returns `false` when the edit does not apply to
/// this kind of annotation or would not change anything.
pub fn apply(annotation: &mut Annotation, edit: &PropertyEdit) -> bool {
    match edit {
        PropertyEdit::Color(color) => {
            if annotation.color == *color {
                return false;
            }
            annotation.color = color.clone();
            true
        }
        PropertyEdit::Opacity(opacity) => {
            let opacity = opacity.clamp(0.0, 1.0);
            if annotation.opacity == opacity {
                return false;
            }
            annotation.opacity = opacity;
            true
        }
        PropertyEdit::Fill(value) => match &mut annotation.kind {
            AnnotationKind::Circle { fill, .. }
            | AnnotationKind::Rectangle { fill, .. }
            | AnnotationKind::Highlight { fill, .. } => {
                let changed = *fill != *value;
                *fill = *value;
                changed
            }
            _ => false,
        },
        PropertyEdit::FontSize(size) => match &mut annotation.kind {
            AnnotationKind::Text { font_size, .. } => {
                let size = size.max(MIN_FONT_SIZE);
                let changed = *font_size != size;
                *font_size = size;
                changed
            }
            _ => false,
        },
        PropertyEdit::Text(value) => match &mut annotation.kind {
            AnnotationKind::Text { text, .. } | AnnotationKind::Label { text, .. } => {
                if value.trim().is_empty() || *text == *value {
                    return false;
                }
                *text = value.clone();
                true
            }
            _ => false,
        },
    }
}
