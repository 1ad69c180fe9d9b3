// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The element store.
//!
//! This module owns every track and measurement line of a session, the
//! active selection, the pending undo record and the line being defined.
//! Callers mutate it through the methods below and hear about changes
//! through [`StoreEvent`] listeners.
//!
//! Misuse (bad index, no active element, wrong element kind) is reported by
//! a `false` or `None` return and leaves the store untouched.

pub mod events;
pub mod line_definition;
pub mod undo;

pub use events::{Listeners, StoreEvent, SubscriptionId};
pub use line_definition::{LineDefinition, LineStep};
pub use undo::{UndoBuffer, UndoRecord};

use crate::config::OverlaySettings;
use crate::models::{AnalysisState, Element, ElementKind, Point, VisibilityMode};
use crate::util::geometry;
use crate::view::visuals::{self, LabelOptions, VisualDirective};
use crate::view::LengthFormatter;

/// Point count and frame span of one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSummary {
    pub id: u32,
    pub point_count: usize,
    pub first_frame: Option<usize>,
    pub last_frame: Option<usize>,
}

/// Owns the elements of an annotation session.
#[derive(Debug, Default)]
pub struct ElementStore {
    elements: Vec<Element>,
    active: Option<usize>,
    undo: UndoBuffer,
    line_definition: LineDefinition,
    settings: OverlaySettings,
    listeners: Listeners,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: OverlaySettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    // --- Notifications ---

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn emit(&mut self, event: StoreEvent) {
        self.listeners.emit(event);
    }

    // --- Settings ---

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: OverlaySettings) {
        if self.settings != settings {
            self.settings = settings;
            self.emit(StoreEvent::VisualsNeedUpdate);
        }
    }

    // --- Lifecycle ---

    /// Remove every element and return to the initial state.
    pub fn reset(&mut self) {
        log::info!("Resetting element store ({} elements)", self.elements.len());
        self.elements.clear();
        self.active = None;
        self.line_definition.reset();
        self.clear_undo();
        self.emit(StoreEvent::ElementListChanged);
        self.emit(StoreEvent::ActiveElementChanged);
    }

    fn next_element_id(&self) -> u32 {
        self.elements.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    /// Append an empty track, make it active and return its id.
    pub fn create_track(&mut self) -> u32 {
        let id = self.next_element_id();
        self.elements.push(Element::new_track(id));
        let index = self.elements.len() - 1;
        self.set_active_element(Some(index));
        self.clear_undo();
        self.emit(StoreEvent::ElementListChanged);
        log::info!("Created track ID {}", id);
        id
    }

    /// Append a measurement line, make it active and wait for its first point.
    pub fn create_line(&mut self) -> u32 {
        let id = self.next_element_id();
        self.elements.push(Element::new_line(id));
        let index = self.elements.len() - 1;
        self.set_active_element(Some(index));
        self.line_definition.begin(id);
        self.clear_undo();
        self.emit(StoreEvent::ElementListChanged);
        log::info!("Created measurement line ID {}, awaiting first point", id);
        id
    }

    /// Abandon the line being defined.
    ///
    /// A line without committed points is removed; otherwise only the
    /// in-flight definition is dropped.
    pub fn cancel_active_line_definition(&mut self) {
        let Some(defining_id) = self.line_definition.element_id() else {
            log::debug!("No line definition in progress to cancel");
            return;
        };

        if let Some(index) = self.active.filter(|&i| self.elements[i].id == defining_id) {
            let element = &self.elements[index];
            if element.kind() == ElementKind::MeasurementLine && element.points().is_empty() {
                log::info!("Cancelled definition of line ID {}, removing it", defining_id);
                self.elements.remove(index);
                self.line_definition.reset();
                self.active = None;
                self.emit(StoreEvent::ElementListChanged);
                self.emit(StoreEvent::ActiveElementChanged);
                self.emit(StoreEvent::VisualsNeedUpdate);
                self.clear_undo();
                return;
            }
        }

        self.line_definition.reset();
        self.emit(StoreEvent::VisualsNeedUpdate);
        log::debug!("Reset line definition state for ID {}", defining_id);
    }

    /// Remove the element at `index`.
    pub fn delete_element(&mut self, index: usize) -> bool {
        if index >= self.elements.len() {
            log::error!("Cannot delete element: index {} out of bounds", index);
            return false;
        }

        let removed = self.elements.remove(index);
        if self.line_definition.is_defining(removed.id) {
            self.line_definition.reset();
            log::debug!("Reset line definition, its element was deleted");
        }

        let previous_active = self.active;
        self.active = match self.active {
            Some(a) if a == index => None,
            Some(a) if a > index => Some(a - 1),
            other => other,
        };

        // Stored indices would point at the wrong element now
        self.clear_undo();
        self.emit(StoreEvent::ElementListChanged);
        if self.active != previous_active {
            self.emit(StoreEvent::ActiveElementChanged);
        }
        if removed.is_visible() {
            self.emit(StoreEvent::VisualsNeedUpdate);
        }
        log::info!("Deleted {} ID {}", removed.kind(), removed.id);
        true
    }

    /// Select the element at `index`, or nothing.
    ///
    /// An out-of-range index deselects. Moving away from a line that is
    /// being defined abandons the definition and removes the line if it has
    /// no points.
    pub fn set_active_element(&mut self, index: Option<usize>) {
        let mut new_active = match index {
            Some(i) if i < self.elements.len() => Some(i),
            Some(i) => {
                log::warn!("Invalid element index {}, deselecting", i);
                None
            }
            None => None,
        };

        if new_active == self.active {
            return;
        }

        let old_active = self.active;
        let old_was_visible = old_active.is_some_and(|i| self.elements[i].is_visible());

        if let Some(old) = old_active {
            let old_element = &self.elements[old];
            if self.line_definition.is_defining(old_element.id) {
                log::info!(
                    "Abandoning definition of line ID {} after selection change",
                    old_element.id
                );
                if old_element.points().is_empty() {
                    self.elements.remove(old);
                    if let Some(n) = new_active.filter(|&n| n > old) {
                        new_active = Some(n - 1);
                    }
                    self.emit(StoreEvent::ElementListChanged);
                }
                self.line_definition.reset();
            }
        }

        self.active = new_active;
        self.clear_undo();
        self.emit(StoreEvent::ActiveElementChanged);

        let new_is_visible = new_active.is_some_and(|i| self.elements[i].is_visible());
        if old_was_visible || new_is_visible {
            self.emit(StoreEvent::VisualsNeedUpdate);
        }
        log::debug!("Active element set to {:?}", self.active);
    }

    pub fn set_visibility_mode(&mut self, index: usize, mode: VisibilityMode) {
        let Some(element) = self.elements.get_mut(index) else {
            return;
        };
        if element.visibility == mode {
            return;
        }
        let old = std::mem::replace(&mut element.visibility, mode);
        log::debug!("Visibility of element ID {} set to {}", element.id, mode);
        if old != VisibilityMode::Hidden || mode != VisibilityMode::Hidden {
            self.emit(StoreEvent::VisualsNeedUpdate);
        }
        self.emit(StoreEvent::ElementListChanged);
    }

    /// Set the visibility of every element, or only those of one kind.
    pub fn set_all_visibility(&mut self, mode: VisibilityMode, kind: Option<ElementKind>) {
        let mut changed_any = false;
        for element in self
            .elements
            .iter_mut()
            .filter(|e| kind.map_or(true, |k| e.kind() == k))
        {
            if element.visibility != mode {
                element.visibility = mode;
                changed_any = true;
            }
        }
        if changed_any {
            self.emit(StoreEvent::ElementListChanged);
            self.emit(StoreEvent::VisualsNeedUpdate);
        }
    }

    /// Replace the fit state of the track with id `track_id`.
    pub fn update_track_analysis_state(&mut self, track_id: u32, state: AnalysisState) -> bool {
        let Some(index) = self
            .elements
            .iter()
            .position(|e| e.id == track_id && e.is_track())
        else {
            log::warn!("Cannot update analysis state: track ID {} not found", track_id);
            return false;
        };

        if let Some(analysis) = self.elements[index].analysis_mut() {
            *analysis = state;
        }
        log::info!("Analysis state updated for track ID {}", track_id);
        self.emit(StoreEvent::ElementListChanged);
        if self.active == Some(index) {
            self.emit(StoreEvent::ActiveElementChanged);
        }
        true
    }

    // --- Point editing ---

    /// Add a point to the active element on `frame`.
    ///
    /// On a track this inserts or replaces the point for that frame and can
    /// be undone. On a line being defined it supplies the next endpoint.
    pub fn add_point(&mut self, frame: usize, time_ms: f64, x: f64, y: f64) -> bool {
        let Some(index) = self.active else {
            log::warn!("add_point: no active element");
            self.clear_undo();
            return false;
        };
        let point = Point::rounded(frame, time_ms, x, y);
        let element_id = self.elements[index].id;

        match self.elements[index].kind() {
            ElementKind::Track => {
                let element = &mut self.elements[index];
                let record = match element.upsert_point(point) {
                    Some(previous) => UndoRecord::PointModified {
                        element_index: index,
                        frame,
                        previous,
                    },
                    None => UndoRecord::PointAdded {
                        element_index: index,
                        frame,
                    },
                };
                element.invalidate_fit();
                let visible = element.is_visible();
                self.undo.record(record);

                self.emit(StoreEvent::UndoStateChanged(true));
                self.emit(StoreEvent::ActiveElementChanged);
                self.emit(StoreEvent::ElementListChanged);
                if visible {
                    self.emit(StoreEvent::VisualsNeedUpdate);
                }
                true
            }
            ElementKind::MeasurementLine if self.line_definition.is_defining(element_id) => {
                match self.line_definition.accept_point(point) {
                    LineStep::FirstPointStored => {
                        log::info!(
                            "Line ID {}: first point set on frame {}, awaiting second point",
                            element_id,
                            frame
                        );
                        self.emit(StoreEvent::VisualsNeedUpdate);
                        true
                    }
                    LineStep::Committed { first, second } => {
                        let element = &mut self.elements[index];
                        element.commit_line(first, second);
                        element.debug_check_invariants();
                        let visible = element.is_visible();
                        log::info!("Line ID {}: defined on frame {}", element_id, frame);

                        self.clear_undo();
                        self.emit(StoreEvent::ActiveElementChanged);
                        self.emit(StoreEvent::ElementListChanged);
                        if visible {
                            self.emit(StoreEvent::VisualsNeedUpdate);
                        }
                        true
                    }
                    LineStep::FrameMismatch { expected, got } => {
                        log::warn!(
                            "Line ID {}: second point must be on frame {} (got {}), ignored",
                            element_id,
                            expected,
                            got
                        );
                        false
                    }
                    LineStep::NotDefining => false,
                }
            }
            kind => {
                log::warn!(
                    "add_point: active element ID {} ({}) is not accepting points",
                    element_id,
                    kind
                );
                self.clear_undo();
                false
            }
        }
    }

    /// Delete the point on `frame` from the track at `index`.
    pub fn delete_point(&mut self, index: usize, frame: usize) -> bool {
        let removed = match self.elements.get_mut(index) {
            Some(element) if element.is_track() => element.remove_point(frame),
            _ => None,
        };
        let Some(deleted) = removed else {
            self.clear_undo();
            return false;
        };

        let element = &mut self.elements[index];
        element.invalidate_fit();
        let visible = element.is_visible();
        log::info!("Deleted point on frame {} from track ID {}", frame, element.id);
        self.undo.record(UndoRecord::PointDeleted {
            element_index: index,
            frame,
            deleted,
        });

        self.emit(StoreEvent::UndoStateChanged(true));
        if self.active == Some(index) {
            self.emit(StoreEvent::ActiveElementChanged);
        }
        self.emit(StoreEvent::ElementListChanged);
        if visible {
            self.emit(StoreEvent::VisualsNeedUpdate);
        }
        true
    }

    // --- Undo ---

    fn clear_undo(&mut self) {
        self.undo.clear();
        self.emit(StoreEvent::UndoStateChanged(false));
    }

    fn undo_target(&self, record: &UndoRecord) -> Option<usize> {
        let index = record.element_index();
        self.elements
            .get(index)
            .filter(|e| e.is_track())
            .map(|_| index)
    }

    /// Whether the last track point edit can be reverted.
    pub fn can_undo(&self) -> bool {
        self.undo
            .pending()
            .is_some_and(|record| self.undo_target(record).is_some())
    }

    /// Revert the last track point edit.
    ///
    /// The pending record is consumed whether or not the revert succeeds.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo.take() else {
            return false;
        };
        let Some(index) = self.undo_target(&record) else {
            self.emit(StoreEvent::UndoStateChanged(false));
            return false;
        };

        let element = &mut self.elements[index];
        let reverted = match record {
            UndoRecord::PointAdded { frame, .. } => element.remove_point(frame).is_some(),
            UndoRecord::PointModified { previous, .. } => {
                let restored = element.replace_point(previous).is_some();
                if !restored {
                    log::error!(
                        "Undo: no point on frame {} in track ID {}",
                        previous.frame,
                        element.id
                    );
                }
                restored
            }
            UndoRecord::PointDeleted { deleted, .. } => {
                if element.upsert_point(deleted).is_some() {
                    log::warn!(
                        "Undo: frame {} of track ID {} was already filled, overwritten",
                        deleted.frame,
                        element.id
                    );
                }
                true
            }
        };

        if reverted {
            element.invalidate_fit();
            let visible = element.is_visible();
            log::info!("Undid point edit on frame {} of track ID {}", record.frame(), element.id);
            if self.active == Some(index) {
                self.emit(StoreEvent::ActiveElementChanged);
            }
            self.emit(StoreEvent::ElementListChanged);
            if visible {
                self.emit(StoreEvent::VisualsNeedUpdate);
            }
        }
        self.emit(StoreEvent::UndoStateChanged(false));
        reverted
    }

    // --- Queries ---

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    fn active_element(&self) -> Option<&Element> {
        self.active.and_then(|i| self.elements.get(i))
    }

    pub fn active_element_id(&self) -> Option<u32> {
        self.active_element().map(|e| e.id)
    }

    pub fn active_element_kind(&self) -> Option<ElementKind> {
        self.active_element().map(Element::kind)
    }

    /// Visibility of the element at `index`; hidden if there is none.
    pub fn visibility_mode(&self, index: usize) -> VisibilityMode {
        self.elements
            .get(index)
            .map_or(VisibilityMode::Hidden, |e| e.visibility)
    }

    pub fn line_definition(&self) -> &LineDefinition {
        &self.line_definition
    }

    /// First endpoint of the line being defined, once placed.
    pub fn pending_line_point(&self) -> Option<Point> {
        self.line_definition.first_point()
    }

    /// The active track's point on `frame`.
    pub fn point_for_active_element(&self, frame: usize) -> Option<Point> {
        self.active_element()
            .filter(|e| e.is_track())
            .and_then(|e| e.point_at(frame).copied())
    }

    /// Copy of the active element's points if it is a track.
    pub fn active_track_points(&self) -> Vec<Point> {
        self.active_element()
            .filter(|e| e.is_track())
            .map(|e| e.points().to_vec())
            .unwrap_or_default()
    }

    /// Nearest track point visible on `frame` within the click tolerance.
    ///
    /// Returns the owning element's index and the point.
    pub fn find_closest_visible_point(&self, x: f64, y: f64, frame: usize) -> Option<(usize, Point)> {
        let mut best_dist_sq = self.settings.click_tolerance_sq();
        let mut best = None;

        for (index, element) in self.elements.iter().enumerate() {
            if !element.is_track() || !element.is_visible() {
                continue;
            }
            for point in element
                .points()
                .iter()
                .filter(|p| element.visibility.shows(p.frame, frame))
            {
                let dist_sq = geometry::distance_sq((x, y), point.position());
                if dist_sq < best_dist_sq {
                    best_dist_sq = dist_sq;
                    best = Some((index, *point));
                }
            }
        }
        best
    }

    /// Index of the track owning the nearest visible point, if any.
    pub fn find_closest_visible_track(&self, x: f64, y: f64, frame: usize) -> Option<usize> {
        self.find_closest_visible_point(x, y, frame)
            .map(|(index, _)| index)
    }

    /// Owned copies of every element of `kind`.
    pub fn elements_of_kind(&self, kind: ElementKind) -> Vec<Element> {
        self.elements
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn track_summaries(&self) -> Vec<TrackSummary> {
        self.elements
            .iter()
            .filter(|e| e.is_track())
            .map(|e| TrackSummary {
                id: e.id,
                point_count: e.points().len(),
                first_frame: e.first_frame(),
                last_frame: e.last_frame(),
            })
            .collect()
    }

    /// Draw directives for `frame`, labelling lines through `lengths`.
    pub fn visuals(&self, frame: usize, lengths: &dyn LengthFormatter) -> Vec<VisualDirective> {
        let labels = self
            .settings
            .show_measurement_line_lengths
            .then(|| LabelOptions {
                formatter: lengths,
                font_size: self.settings.line_length_font_size,
                color: self.settings.line_length_text_color.clone(),
            });
        visuals::resolve(frame, &self.elements, self.active, labels.as_ref())
    }

    // --- Loading ---

    /// Append an element read from a project file.
    pub(crate) fn push_loaded(&mut self, element: Element) {
        element.debug_check_invariants();
        self.elements.push(element);
    }

    /// Announce the end of a load.
    pub(crate) fn finish_load(&mut self) {
        self.active = None;
        self.emit(StoreEvent::ElementListChanged);
        self.emit(StoreEvent::ActiveElementChanged);
        self.emit(StoreEvent::VisualsNeedUpdate);
        self.clear_undo();
    }
}
