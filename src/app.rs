// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state.
//!
//! [`FloorplanView`] ties the pieces together: the loaded floorplan (pixel
//! transform and room index), the annotation set, the interactive editor,
//! the on-screen viewport and undo/redo history. Pointer input arrives in
//! screen space and is converted through the viewport before reaching the
//! editor.

use crate::config::FloorplanConfig;
use crate::error::{FloorplanError, IngestError};
use crate::floorplan::ingest;
use crate::floorplan::room_index::RoomIndex;
use crate::floorplan::transform::Transformer;
use crate::io::payload::{self, BlockScanner};
use crate::models::annotation::Annotation;
use crate::models::annotation_set::AnnotationSet;
use crate::models::room::RoomDataset;
use crate::ui::canvas::{AnnotationEditor, EditOutcome, Modifiers, PointerEvent};
use crate::ui::properties::{self, PropertyEdit};
use crate::ui::toolbar::Tool;
use crate::util::geometry::{Point, Viewport};

/// Number of undo steps kept.
pub const HISTORY_SIZE: usize = 50;

/// History system for undo/redo functionality.
#[derive(Debug)]
struct History {
    /// Undo stack (past states)
    undo_stack: Vec<Vec<Annotation>>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<Vec<Annotation>>,
    max_size: usize,
}

impl History {
    fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Save the state preceding a change
    fn push(&mut self, annotations: Vec<Annotation>) {
        self.undo_stack.push(annotations);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // A new change invalidates the redo branch
        self.redo_stack.clear();
    }

    fn undo(&mut self, current: Vec<Annotation>) -> Option<Vec<Annotation>> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    fn redo(&mut self, current: Vec<Annotation>) -> Option<Vec<Annotation>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

/// A floorplan prepared for display and room lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Floorplan {
    pub transformer: Transformer,
    pub index: RoomIndex,
}

impl Floorplan {
    pub fn build(dataset: &RoomDataset, config: &FloorplanConfig) -> Result<Self, FloorplanError> {
        let transformer = Transformer::build(dataset, &config.scale_strategy())?;
        let index = RoomIndex::build(dataset, &transformer)?;
        Ok(Self { transformer, index })
    }
}

/// The annotated floorplan view.
pub struct FloorplanView {
    config: FloorplanConfig,
    /// `None` until a dataset loads; the view then shows a placeholder.
    floorplan: Option<Floorplan>,
    annotations: AnnotationSet,
    editor: AnnotationEditor,
    viewport: Viewport,
    tool: Tool,
    history: History,
    /// Annotations as they were when the running gesture began.
    pending: Option<Vec<Annotation>>,
    scanner: BlockScanner,
    /// Last screen position of an active pan drag.
    pan_from: Option<Point>,
}

impl Default for FloorplanView {
    fn default() -> Self {
        Self::new(FloorplanConfig::default())
    }
}

impl FloorplanView {
    pub fn new(config: FloorplanConfig) -> Self {
        Self {
            editor: AnnotationEditor::new(config.style.clone()),
            config,
            floorplan: None,
            annotations: AnnotationSet::new(),
            viewport: Viewport::default(),
            tool: Tool::default(),
            history: History::new(HISTORY_SIZE),
            pending: None,
            scanner: BlockScanner::new(),
            pan_from: None,
        }
    }

    pub fn config(&self) -> &FloorplanConfig {
        &self.config
    }

    pub fn floorplan(&self) -> Option<&Floorplan> {
        self.floorplan.as_ref()
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn editor(&self) -> &AnnotationEditor {
        &self.editor
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Build the pixel transform and room index for `dataset`.
    ///
    /// On failure the view keeps running without a floorplan.
    pub fn load_rooms(&mut self, dataset: &RoomDataset) -> Result<(), FloorplanError> {
        match Floorplan::build(dataset, &self.config) {
            Ok(floorplan) => {
                log::info!(
                    "Loaded floorplan with {} rooms on {} stories",
                    floorplan.index.len(),
                    floorplan.transformer.stories().count()
                );
                self.floorplan = Some(floorplan);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load floorplan: {}", e);
                self.floorplan = None;
                Err(e)
            }
        }
    }

    /// Run `f` as one undoable step.
    ///
    /// While the editor is mid-gesture the step stays open, so a whole drag
    /// or text edit becomes a single history entry.
    fn record<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        if self.pending.is_none() {
            self.pending = Some(self.annotations.snapshot());
        }
        let out = f(self);
        if self.editor.is_idle() {
            self.settle();
        }
        out
    }

    fn settle(&mut self) {
        if let Some(before) = self.pending.take() {
            if before.as_slice() != self.annotations.as_slice() {
                self.history.push(before);
            }
        }
    }

    /// Ingest a JSON intent payload, replacing all machine annotations.
    ///
    /// A malformed payload is logged and leaves the annotations unchanged.
    /// Returns the number of machine annotations now present.
    pub fn apply_payload(&mut self, json: &str) -> Result<usize, IngestError> {
        let fallback = RoomIndex::default();
        let index = self
            .floorplan
            .as_ref()
            .map_or(&fallback, |floorplan| &floorplan.index);
        let batch = match ingest::ingest_json(json, index, &self.config.vocabulary) {
            Ok(batch) => batch,
            Err(e) => {
                log::warn!("Ignoring annotation payload: {}", e);
                return Err(e);
            }
        };
        let count = batch.len();
        self.record(|view| view.annotations.replace_machine(batch));
        Ok(count)
    }

    /// Apply the last annotation block found in a complete model response.
    ///
    /// Returns `Ok(None)` when the text carries no block.
    pub fn apply_model_text(&mut self, text: &str) -> Result<Option<usize>, IngestError> {
        match payload::extract_annotation_block(text) {
            Some(block) => self.apply_payload(block).map(Some),
            None => Ok(None),
        }
    }

    /// Feed a chunk of a streamed model response. Each block completed by
    /// the chunk is applied in order; returns how many applied cleanly.
    pub fn feed_stream(&mut self, chunk: &str) -> usize {
        let mut applied = 0;
        for block in self.scanner.push(chunk) {
            if self.apply_payload(&block).is_ok() {
                applied += 1;
            }
        }
        applied
    }

    /// Start a new streamed response.
    pub fn reset_stream(&mut self) {
        self.scanner = BlockScanner::new();
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.tool {
            return;
        }
        self.finish_interaction();
        log::info!("{} tool: {}", tool.name(), tool.description());
        self.tool = tool;
    }

    /// Commit any open text edit and drop other half-finished gestures.
    fn finish_interaction(&mut self) {
        self.record(|view| {
            view.editor.commit_text(&mut view.annotations);
            view.editor.reset();
        });
        self.pan_from = None;
    }

    fn event(&self, screen: Point, modifiers: Modifiers) -> PointerEvent {
        PointerEvent {
            point: self.viewport.screen_to_canvas(screen),
            tool: self.tool,
            modifiers,
        }
    }

    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> EditOutcome {
        let event = self.event(screen, modifiers);
        let outcome = self.record(|view| view.editor.pointer_down(&mut view.annotations, event));
        if outcome == EditOutcome::PassThrough {
            self.pan_from = Some(screen);
        }
        outcome
    }

    pub fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> EditOutcome {
        if let Some(from) = self.pan_from {
            self.viewport.pan_by(screen - from);
            self.pan_from = Some(screen);
            return EditOutcome::PassThrough;
        }
        let event = self.event(screen, modifiers);
        self.record(|view| view.editor.pointer_move(&mut view.annotations, event))
    }

    pub fn pointer_up(&mut self, screen: Point, modifiers: Modifiers) -> EditOutcome {
        if let Some(from) = self.pan_from.take() {
            self.viewport.pan_by(screen - from);
            return EditOutcome::PassThrough;
        }
        let event = self.event(screen, modifiers);
        self.record(|view| view.editor.pointer_up(&mut view.annotations, event))
    }

    pub fn pointer_leave(&mut self, screen: Point, modifiers: Modifiers) -> EditOutcome {
        self.pointer_up(screen, modifiers)
    }

    /// Double-click.
    pub fn activate(&mut self, screen: Point) -> EditOutcome {
        let event = self.event(screen, Modifiers::default());
        self.record(|view| view.editor.activate(&mut view.annotations, event))
    }

    pub fn update_text(&mut self, value: &str) -> bool {
        self.editor.update_text(value)
    }

    pub fn commit_text(&mut self) -> EditOutcome {
        self.record(|view| view.editor.commit_text(&mut view.annotations))
    }

    pub fn cancel_text(&mut self) -> EditOutcome {
        self.record(|view| view.editor.cancel_text(&mut view.annotations))
    }

    pub fn delete_selected(&mut self) -> EditOutcome {
        self.record(|view| view.editor.delete_selected(&mut view.annotations))
    }

    /// Remove every annotation, user and machine alike.
    pub fn clear_all(&mut self) {
        self.editor.reset();
        self.record(|view| view.annotations.clear());
        log::info!("Cleared all annotations");
    }

    /// Apply a property change to the selected annotation.
    pub fn edit_selected(&mut self, edit: &PropertyEdit) -> bool {
        let Some(id) = self.annotations.selected_id() else {
            return false;
        };
        self.record(|view| {
            view.annotations
                .get_mut(id)
                .is_some_and(|annotation| properties::apply(annotation, edit))
        })
    }

    pub fn undo(&mut self) -> bool {
        self.finish_interaction();
        match self.history.undo(self.annotations.snapshot()) {
            Some(previous) => {
                self.annotations.restore(previous);
                log::debug!("Undo, {} annotations", self.annotations.len());
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.finish_interaction();
        match self.history.redo(self.annotations.snapshot()) {
            Some(next) => {
                self.annotations.restore(next);
                log::debug!("Redo, {} annotations", self.annotations.len());
                true
            }
            None => false,
        }
    }

    /// Zoom by `factor` around a screen position.
    pub fn zoom(&mut self, focus: Point, factor: f64) {
        self.viewport.zoom_at(focus, factor);
    }
}
