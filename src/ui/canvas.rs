// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive annotation editing on the floorplan canvas.
//!
//! [`AnnotationEditor`] is a small state machine fed with pointer events that
//! are already expressed in canvas coordinates. It turns them, together with
//! the active [`Tool`], into mutations of an [`AnnotationSet`]: creating
//! shapes, strokes and text, moving, resizing and deleting.
//!
//! A pointer-up (or leave) always brings a gesture back to `Idle`, and events
//! that do not fit the current state are ignored.

use crate::models::annotation::{
    Annotation, AnnotationId, AnnotationKind, Handle, HeuristicTextMeasure, Origin, Style,
    TextMeasure,
};
use crate::models::annotation_set::AnnotationSet;
use crate::ui::toolbar::Tool;
use crate::util::geometry::{Point, Rect};

/// Shapes smaller than this (in either dimension) are treated as stray clicks.
pub const MIN_SHAPE_SIZE: f64 = 2.0;

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Constrain rectangles to squares.
    pub shift: bool,
}

/// A pointer event in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub point: Point,
    pub tool: Tool,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(point: Point, tool: Tool) -> Self {
        Self {
            point,
            tool,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

/// Geometry of an annotation being drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Pencil { points: Vec<Point> },
    Circle { start: Point, end: Point },
    Rectangle { start: Point, end: Point, square: bool },
}

/// Editor interaction state.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Idle,
    Drawing(Gesture),
    Dragging {
        target: AnnotationId,
        last: Point,
        moved: bool,
    },
    /// `anchor` and `original` are captured when the resize starts; every
    /// move recomputes the shape from them.
    Resizing {
        target: AnnotationId,
        handle: Handle,
        anchor: Point,
        original: Annotation,
    },
    /// `original` holds the text of an existing annotation being re-edited,
    /// or `None` for a freshly placed one.
    EditingText {
        target: AnnotationId,
        buffer: String,
        original: Option<String>,
    },
}

/// What an event did to the annotation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    None,
    /// The event belongs to the pan/zoom controller.
    PassThrough,
    Created(AnnotationId),
    Selected(AnnotationId),
    Deselected,
    Moved(AnnotationId),
    Resized(AnnotationId),
    Deleted(AnnotationId),
    TextEditStarted(AnnotationId),
    TextCommitted(AnnotationId),
    TextDiscarded,
}

/// Converts pointer gestures into annotation set mutations.
pub struct AnnotationEditor {
    state: EditorState,
    style: Style,
    measure: Box<dyn TextMeasure>,
}

impl Default for AnnotationEditor {
    fn default() -> Self {
        Self::new(Style::default())
    }
}

impl AnnotationEditor {
    pub fn new(style: Style) -> Self {
        Self::with_measure(style, Box::new(HeuristicTextMeasure))
    }

    pub fn with_measure(style: Style, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            state: EditorState::Idle,
            style,
            measure,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == EditorState::Idle
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    /// Abandon any gesture without touching the set.
    pub fn reset(&mut self) {
        self.state = EditorState::Idle;
    }

    pub fn pointer_down(&mut self, set: &mut AnnotationSet, event: PointerEvent) -> EditOutcome {
        match self.state {
            EditorState::Idle => {}
            EditorState::EditingText { .. } => {
                let committed = self.commit_text(set);
                log::debug!("Pointer down while editing text: {:?}", committed);
            }
            _ => {
                let finished = self.finish_pending(set);
                log::debug!("Pointer down with a pending gesture: {:?}", finished);
            }
        }

        let point = event.point;
        match event.tool {
            Tool::Pan => EditOutcome::PassThrough,
            Tool::Select => self.begin_select(set, point),
            Tool::Pencil => {
                self.state = EditorState::Drawing(Gesture::Pencil {
                    points: vec![point],
                });
                EditOutcome::None
            }
            Tool::Circle => {
                self.state = EditorState::Drawing(Gesture::Circle {
                    start: point,
                    end: point,
                });
                EditOutcome::None
            }
            Tool::Rectangle => {
                self.state = EditorState::Drawing(Gesture::Rectangle {
                    start: point,
                    end: point,
                    square: event.modifiers.shift,
                });
                EditOutcome::None
            }
            Tool::Text => {
                let annotation = Annotation::new(
                    Origin::User,
                    point,
                    self.style.color.clone(),
                    self.style.opacity,
                    AnnotationKind::Text {
                        text: String::new(),
                        font_size: self.style.font_size,
                    },
                );
                let id = set.push(annotation);
                set.select(id);
                self.state = EditorState::EditingText {
                    target: id,
                    buffer: String::new(),
                    original: None,
                };
                EditOutcome::TextEditStarted(id)
            }
        }
    }

    fn begin_select(&mut self, set: &mut AnnotationSet, point: Point) -> EditOutcome {
        if let Some(selected) = set.selected() {
            if let Some(handle) = selected.handle_at(point) {
                let target = selected.id;
                log::debug!("Resizing {} from {:?}", target, handle);
                self.state = EditorState::Resizing {
                    target,
                    handle,
                    anchor: point,
                    original: selected.clone(),
                };
                return EditOutcome::Selected(target);
            }
        }

        match set.hit_test(point, self.measure.as_ref()).map(|a| a.id) {
            Some(id) => {
                set.select(id);
                self.state = EditorState::Dragging {
                    target: id,
                    last: point,
                    moved: false,
                };
                EditOutcome::Selected(id)
            }
            None => {
                let had_selection = set.selected_id().is_some();
                set.deselect();
                if had_selection {
                    EditOutcome::Deselected
                } else {
                    EditOutcome::None
                }
            }
        }
    }

    pub fn pointer_move(&mut self, set: &mut AnnotationSet, event: PointerEvent) -> EditOutcome {
        let point = event.point;
        match &mut self.state {
            EditorState::Idle => {
                if event.tool == Tool::Pan {
                    EditOutcome::PassThrough
                } else {
                    EditOutcome::None
                }
            }
            EditorState::Drawing(Gesture::Pencil { points }) => {
                if points.last() != Some(&point) {
                    points.push(point);
                }
                EditOutcome::None
            }
            EditorState::Drawing(Gesture::Circle { end, .. }) => {
                *end = point;
                EditOutcome::None
            }
            EditorState::Drawing(Gesture::Rectangle { end, square, .. }) => {
                *end = point;
                *square = event.modifiers.shift;
                EditOutcome::None
            }
            EditorState::Dragging {
                target,
                last,
                moved,
            } => {
                let target = *target;
                let delta = point - *last;
                *last = point;
                if delta == Point::ZERO {
                    return EditOutcome::None;
                }
                match set.get_mut(target) {
                    Some(annotation) => {
                        annotation.translate(delta);
                        *moved = true;
                        EditOutcome::Moved(target)
                    }
                    None => {
                        self.state = EditorState::Idle;
                        EditOutcome::None
                    }
                }
            }
            EditorState::Resizing {
                target,
                handle,
                anchor,
                original,
            } => {
                let target = *target;
                let resized = original.resized(*handle, point - *anchor);
                match set.get_mut(target) {
                    Some(annotation) => {
                        *annotation = resized;
                        EditOutcome::Resized(target)
                    }
                    None => {
                        self.state = EditorState::Idle;
                        EditOutcome::None
                    }
                }
            }
            EditorState::EditingText { .. } => EditOutcome::None,
        }
    }

    pub fn pointer_up(&mut self, set: &mut AnnotationSet, event: PointerEvent) -> EditOutcome {
        if matches!(self.state, EditorState::EditingText { .. }) {
            return EditOutcome::None;
        }
        if self.is_idle() {
            return if event.tool == Tool::Pan {
                EditOutcome::PassThrough
            } else {
                EditOutcome::None
            };
        }

        self.pointer_move(set, event);
        self.finish_pending(set)
    }

    /// End the running gesture at its last known geometry.
    fn finish_pending(&mut self, set: &mut AnnotationSet) -> EditOutcome {
        match std::mem::replace(&mut self.state, EditorState::Idle) {
            EditorState::Drawing(gesture) => match self.finish_gesture(gesture) {
                Some(annotation) => {
                    let id = set.push(annotation);
                    log::debug!("Created annotation {}, total: {}", id, set.len());
                    EditOutcome::Created(id)
                }
                None => EditOutcome::None,
            },
            EditorState::Dragging {
                target,
                moved: true,
                ..
            } => EditOutcome::Moved(target),
            EditorState::Resizing { target, .. } if set.get(target).is_some() => {
                EditOutcome::Resized(target)
            }
            _ => EditOutcome::None,
        }
    }

    /// Leaving the canvas ends a gesture exactly like releasing the pointer.
    pub fn pointer_leave(&mut self, set: &mut AnnotationSet, event: PointerEvent) -> EditOutcome {
        self.pointer_up(set, event)
    }

    fn finish_gesture(&self, gesture: Gesture) -> Option<Annotation> {
        let style = &self.style;
        match gesture {
            Gesture::Pencil { points } => {
                if points.len() < 2 {
                    return None;
                }
                Annotation::pencil(Origin::User, points, style)
            }
            Gesture::Circle { start, end } => {
                let radius = start.distance(end) / 2.0;
                if radius * 2.0 < MIN_SHAPE_SIZE {
                    return None;
                }
                Some(Annotation::new(
                    Origin::User,
                    start.midpoint(end),
                    style.color.clone(),
                    style.opacity,
                    AnnotationKind::Circle {
                        radius,
                        fill: style.fill,
                    },
                ))
            }
            Gesture::Rectangle { start, end, square } => {
                let end = if square { square_corner(start, end) } else { end };
                let rect = Rect::from_corners(start, end);
                if rect.width < MIN_SHAPE_SIZE || rect.height < MIN_SHAPE_SIZE {
                    return None;
                }
                Some(Annotation::new(
                    Origin::User,
                    Point::new(rect.x, rect.y),
                    style.color.clone(),
                    style.opacity,
                    AnnotationKind::Rectangle {
                        width: rect.width,
                        height: rect.height,
                        fill: style.fill,
                    },
                ))
            }
        }
    }

    /// Re-enter text editing on an existing text annotation (double-click).
    pub fn activate(&mut self, set: &mut AnnotationSet, event: PointerEvent) -> EditOutcome {
        if event.tool != Tool::Select || !self.is_idle() {
            return EditOutcome::None;
        }
        let Some(hit) = set.hit_test(event.point, self.measure.as_ref()) else {
            return EditOutcome::None;
        };
        let AnnotationKind::Text { text, .. } = &hit.kind else {
            return EditOutcome::None;
        };
        let target = hit.id;
        let text = text.clone();
        set.select(target);
        self.state = EditorState::EditingText {
            target,
            buffer: text.clone(),
            original: Some(text),
        };
        EditOutcome::TextEditStarted(target)
    }

    /// Replace the text being edited. Returns `false` when not editing.
    pub fn update_text(&mut self, value: &str) -> bool {
        match &mut self.state {
            EditorState::EditingText { buffer, .. } => {
                buffer.clear();
                buffer.push_str(value);
                true
            }
            _ => false,
        }
    }

    /// Commit the edit buffer (blur or Enter). An empty buffer deletes the
    /// annotation.
    pub fn commit_text(&mut self, set: &mut AnnotationSet) -> EditOutcome {
        if !matches!(self.state, EditorState::EditingText { .. }) {
            return EditOutcome::None;
        }
        let EditorState::EditingText { target, buffer, .. } =
            std::mem::replace(&mut self.state, EditorState::Idle)
        else {
            return EditOutcome::None;
        };

        if buffer.trim().is_empty() {
            return match set.remove(target) {
                Some(_) => EditOutcome::Deleted(target),
                None => EditOutcome::None,
            };
        }
        match set.get_mut(target) {
            Some(Annotation {
                kind: AnnotationKind::Text { text, .. },
                ..
            }) => {
                *text = buffer;
                EditOutcome::TextCommitted(target)
            }
            _ => EditOutcome::None,
        }
    }

    /// Discard the edit buffer (Escape). A freshly placed annotation is
    /// removed; an existing one keeps its previous text.
    pub fn cancel_text(&mut self, set: &mut AnnotationSet) -> EditOutcome {
        if !matches!(self.state, EditorState::EditingText { .. }) {
            return EditOutcome::None;
        }
        let EditorState::EditingText {
            target, original, ..
        } = std::mem::replace(&mut self.state, EditorState::Idle)
        else {
            return EditOutcome::None;
        };
        if original.is_none() {
            set.remove(target);
        }
        EditOutcome::TextDiscarded
    }

    /// Delete the selected annotation.
    pub fn delete_selected(&mut self, set: &mut AnnotationSet) -> EditOutcome {
        let Some(id) = set.selected_id() else {
            return EditOutcome::None;
        };
        self.state = EditorState::Idle;
        match set.remove(id) {
            Some(_) => EditOutcome::Deleted(id),
            None => EditOutcome::None,
        }
    }
}

/// Move `end` so the box spanned from `start` is square, keeping its
/// direction. The longer side wins.
fn square_corner(start: Point, end: Point) -> Point {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let side = dx.abs().max(dy.abs());
    let sign = |v: f64| if v < 0.0 { -1.0 } else { 1.0 };
    Point::new(start.x + side * sign(dx), start.y + side * sign(dy))
}
