// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The owned collection of annotations for one floorplan view.

use super::annotation::{Annotation, AnnotationId, Origin, TextMeasure};
use crate::util::geometry::Point;
use serde::{Deserialize, Serialize};

/// Annotations in creation order plus the current selection.
///
/// Later annotations are drawn on top, so hit-testing walks the list from
/// the most recently created entry backwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
    #[serde(skip)]
    selected: Option<AnnotationId>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// Append an annotation and return its id.
    pub fn push(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id;
        self.annotations.push(annotation);
        id
    }

    /// Remove an annotation, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let idx = self.annotations.iter().position(|a| a.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.annotations.remove(idx))
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
        self.selected = None;
    }

    /// Copy of the annotations, for undo history.
    pub fn snapshot(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    /// Swap in a previous snapshot, returning the annotations it replaced.
    /// The selection survives only if its annotation is still present.
    pub fn restore(&mut self, annotations: Vec<Annotation>) -> Vec<Annotation> {
        let current = std::mem::replace(&mut self.annotations, annotations);
        if let Some(id) = self.selected {
            if self.get(id).is_none() {
                self.selected = None;
            }
        }
        current
    }

    /// Topmost annotation under `point`.
    pub fn hit_test(&self, point: Point, measure: &dyn TextMeasure) -> Option<&Annotation> {
        self.annotations
            .iter()
            .rev()
            .find(|a| a.contains(point, measure))
    }

    pub fn select(&mut self, id: AnnotationId) -> bool {
        if self.get(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<AnnotationId> {
        self.selected
    }

    /// Replace every machine-authored annotation with `batch`.
    ///
    /// User-authored annotations keep their order and stay underneath the
    /// new machine annotations.
    pub fn replace_machine(&mut self, batch: Vec<Annotation>) {
        let before = self.machine_count();
        self.annotations.retain(|a| a.origin == Origin::User);
        if let Some(id) = self.selected {
            if self.get(id).is_none() {
                self.selected = None;
            }
        }
        let added = batch.len();
        self.annotations.extend(batch.into_iter().map(|mut a| {
            a.origin = Origin::Machine;
            a
        }));
        log::info!(
            "Replaced {} machine annotations with {}, total: {}",
            before,
            added,
            self.annotations.len()
        );
    }

    pub fn machine_count(&self) -> usize {
        self.annotations.iter().filter(|a| a.is_machine()).count()
    }

    pub fn user_count(&self) -> usize {
        self.annotations.len() - self.machine_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{AnnotationKind, HeuristicTextMeasure, Style};

    fn square(origin: Origin, x: f64, y: f64) -> Annotation {
        Annotation::new(
            origin,
            Point::new(x, y),
            "#000000",
            1.0,
            AnnotationKind::Highlight {
                width: 100.0,
                height: 100.0,
                fill: true,
            },
        )
    }

    #[test]
    fn test_hit_test_prefers_latest() {
        let mut set = AnnotationSet::new();
        let below = set.push(square(Origin::User, 0.0, 0.0));
        let above = set.push(square(Origin::User, 50.0, 50.0));
        let m = HeuristicTextMeasure;

        assert_eq!(set.hit_test(Point::new(75.0, 75.0), &m).unwrap().id, above);
        assert_eq!(set.hit_test(Point::new(25.0, 25.0), &m).unwrap().id, below);
        assert!(set.hit_test(Point::new(500.0, 500.0), &m).is_none());
    }

    #[test]
    fn test_replace_machine_keeps_user_annotations() {
        let mut set = AnnotationSet::new();
        let drawn = set.push(square(Origin::User, 0.0, 0.0));
        let old = set.push(square(Origin::Machine, 10.0, 10.0));
        set.select(old);

        set.replace_machine(vec![square(Origin::Machine, 20.0, 20.0)]);

        assert_eq!(set.len(), 2);
        assert!(set.get(drawn).is_some());
        assert!(set.get(old).is_none());
        assert_eq!(set.machine_count(), 1);
        assert_eq!(set.user_count(), 1);
        assert!(set.selected().is_none());
    }

    #[test]
    fn test_replace_machine_marks_batch_as_machine() {
        let mut set = AnnotationSet::new();
        set.replace_machine(vec![square(Origin::User, 0.0, 0.0)]);
        assert_eq!(set.machine_count(), 1);
    }

    #[test]
    fn test_restore_drops_stale_selection() {
        let mut set = AnnotationSet::new();
        let kept = set.push(square(Origin::User, 0.0, 0.0));
        let before = set.snapshot();
        let added = set.push(square(Origin::User, 10.0, 10.0));

        set.select(kept);
        let replaced = set.restore(before.clone());
        assert_eq!(replaced.len(), 2);
        assert_eq!(set.selected_id(), Some(kept));

        set.restore(replaced);
        set.select(added);
        set.restore(before);
        assert!(set.selected().is_none());
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut set = AnnotationSet::new();
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        let id = set.push(Annotation::pencil(Origin::User, points, &Style::default()).unwrap());
        assert!(set.select(id));
        assert!(set.remove(id).is_some());
        assert!(set.selected_id().is_none());
        assert!(set.remove(id).is_none());
    }
}
