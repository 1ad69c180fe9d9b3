// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Element data structures.
//!
//! This module defines tracks and measurement lines, the points they are
//! made of, and the visibility modes that decide on which frames they show.

use super::analysis::AnalysisState;
use crate::util::geometry;
use std::fmt;

/// Time value for a point whose timestamp is not known.
pub const UNKNOWN_TIME_MS: f64 = -1.0;

/// A frame-indexed point in top-left pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub frame: usize,
    /// Presentation time in milliseconds, or [`UNKNOWN_TIME_MS`].
    pub time_ms: f64,
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point, keeping coordinates exactly as given.
    pub fn new(frame: usize, time_ms: f64, x: f64, y: f64) -> Self {
        Self { frame, time_ms, x, y }
    }

    /// Create a point with coordinates rounded to the stored precision.
    pub fn rounded(frame: usize, time_ms: f64, x: f64, y: f64) -> Self {
        Self::new(
            frame,
            time_ms,
            geometry::round_coordinate(x),
            geometry::round_coordinate(y),
        )
    }

    /// Whether the timestamp is known.
    pub fn has_time(&self) -> bool {
        self.time_ms >= 0.0
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Kind of element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Track,
    MeasurementLine,
}

impl ElementKind {
    /// Tag used in project files.
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Track => "TRACK",
            ElementKind::MeasurementLine => "MEASUREMENT_LINE",
        }
    }

    /// Parse a project file tag, ignoring case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "TRACK" => Some(ElementKind::Track),
            "MEASUREMENT_LINE" => Some(ElementKind::MeasurementLine),
            _ => None,
        }
    }

    /// Name given to a new element of this kind.
    pub fn default_name(self, id: u32) -> String {
        match self {
            ElementKind::Track => format!("Track {}", id),
            ElementKind::MeasurementLine => format!("Line {}", id),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which frames an element is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibilityMode {
    Hidden,
    /// Only on the frame a point belongs to.
    HomeFrame,
    /// From a point's frame onwards.
    #[default]
    Incremental,
    AlwaysVisible,
}

impl VisibilityMode {
    pub const ALL: [VisibilityMode; 4] = [
        VisibilityMode::Hidden,
        VisibilityMode::HomeFrame,
        VisibilityMode::Incremental,
        VisibilityMode::AlwaysVisible,
    ];

    /// Tag used in project files.
    pub fn tag(self) -> &'static str {
        match self {
            VisibilityMode::Hidden => "HIDDEN",
            VisibilityMode::HomeFrame => "HOME_FRAME",
            VisibilityMode::Incremental => "INCREMENTAL",
            VisibilityMode::AlwaysVisible => "ALWAYS_VISIBLE",
        }
    }

    /// Parse a project file tag, ignoring case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let upper = tag.to_ascii_uppercase();
        Self::ALL.into_iter().find(|mode| mode.tag() == upper)
    }

    /// Whether something anchored at `home_frame` shows on `current_frame`.
    pub fn shows(self, home_frame: usize, current_frame: usize) -> bool {
        match self {
            VisibilityMode::Hidden => false,
            VisibilityMode::HomeFrame => home_frame == current_frame,
            VisibilityMode::Incremental => home_frame <= current_frame,
            VisibilityMode::AlwaysVisible => true,
        }
    }
}

impl fmt::Display for VisibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Kind-specific element data.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementPayload {
    Track { analysis: AnalysisState },
    MeasurementLine,
}

/// A track or measurement line.
///
/// Track points are unique per frame and sorted by frame. A measurement line
/// has either no points (still being defined) or exactly two on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: u32,
    pub name: String,
    pub visibility: VisibilityMode,
    pub(crate) points: Vec<Point>,
    pub payload: ElementPayload,
}

impl Element {
    /// Create an empty track.
    pub fn new_track(id: u32) -> Self {
        Self {
            id,
            name: ElementKind::Track.default_name(id),
            visibility: VisibilityMode::Incremental,
            points: Vec::new(),
            payload: ElementPayload::Track {
                analysis: AnalysisState::default(),
            },
        }
    }

    /// Create a measurement line with no points yet.
    pub fn new_line(id: u32) -> Self {
        Self {
            id,
            name: ElementKind::MeasurementLine.default_name(id),
            visibility: VisibilityMode::Incremental,
            points: Vec::new(),
            payload: ElementPayload::MeasurementLine,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self.payload {
            ElementPayload::Track { .. } => ElementKind::Track,
            ElementPayload::MeasurementLine => ElementKind::MeasurementLine,
        }
    }

    pub fn is_track(&self) -> bool {
        self.kind() == ElementKind::Track
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_visible(&self) -> bool {
        self.visibility != VisibilityMode::Hidden
    }

    pub fn point_at(&self, frame: usize) -> Option<&Point> {
        self.frame_position(frame).ok().map(|i| &self.points[i])
    }

    /// Binary search on frame; only meaningful for tracks.
    fn frame_position(&self, frame: usize) -> Result<usize, usize> {
        self.points.binary_search_by_key(&frame, |p| p.frame)
    }

    /// Insert a track point, replacing any point on the same frame.
    ///
    /// Returns the replaced point.
    pub(crate) fn upsert_point(&mut self, point: Point) -> Option<Point> {
        debug_assert!(self.is_track(), "upsert_point on a measurement line");
        let previous = match self.frame_position(point.frame) {
            Ok(i) => Some(std::mem::replace(&mut self.points[i], point)),
            Err(i) => {
                self.points.insert(i, point);
                None
            }
        };
        self.debug_check_invariants();
        previous
    }

    /// Replace the track point on `point.frame`, if there is one.
    pub(crate) fn replace_point(&mut self, point: Point) -> Option<Point> {
        let i = self.frame_position(point.frame).ok()?;
        Some(std::mem::replace(&mut self.points[i], point))
    }

    /// Remove the track point on `frame`.
    pub(crate) fn remove_point(&mut self, frame: usize) -> Option<Point> {
        let i = self.frame_position(frame).ok()?;
        Some(self.points.remove(i))
    }

    /// Set both endpoints of a measurement line.
    pub(crate) fn commit_line(&mut self, first: Point, second: Point) {
        debug_assert_eq!(self.kind(), ElementKind::MeasurementLine);
        debug_assert_eq!(first.frame, second.frame);
        self.points.clear();
        self.points.push(first);
        self.points.push(second);
    }

    /// Endpoints of a committed measurement line.
    pub fn line_endpoints(&self) -> Option<(&Point, &Point)> {
        match (self.kind(), self.points.as_slice()) {
            (ElementKind::MeasurementLine, [a, b]) => Some((a, b)),
            _ => None,
        }
    }

    /// Frame a committed measurement line was drawn on.
    pub fn definition_frame(&self) -> Option<usize> {
        self.line_endpoints().map(|(a, _)| a.frame)
    }

    pub fn line_length_px(&self) -> Option<f64> {
        self.line_endpoints()
            .map(|(a, b)| geometry::segment_length(a.position(), b.position()))
    }

    pub fn line_angle_deg(&self) -> Option<f64> {
        self.line_endpoints()
            .map(|(a, b)| geometry::segment_angle_deg(a.position(), b.position()))
    }

    pub fn first_frame(&self) -> Option<usize> {
        self.points.first().map(|p| p.frame)
    }

    pub fn last_frame(&self) -> Option<usize> {
        self.points.last().map(|p| p.frame)
    }

    pub fn analysis(&self) -> Option<&AnalysisState> {
        match &self.payload {
            ElementPayload::Track { analysis } => Some(analysis),
            ElementPayload::MeasurementLine => None,
        }
    }

    pub fn analysis_mut(&mut self) -> Option<&mut AnalysisState> {
        match &mut self.payload {
            ElementPayload::Track { analysis } => Some(analysis),
            ElementPayload::MeasurementLine => None,
        }
    }

    /// Drop a stale fit after the track's points changed.
    pub(crate) fn invalidate_fit(&mut self) {
        let id = self.id;
        if let Some(analysis) = self.analysis_mut() {
            if analysis.invalidate_fit() {
                log::info!("Invalidated fit for track ID {} after a point change", id);
            }
        }
    }

    pub(crate) fn debug_check_invariants(&self) {
        match self.kind() {
            ElementKind::Track => debug_assert!(
                self.points.windows(2).all(|w| w[0].frame < w[1].frame),
                "track {} points not strictly ordered by frame",
                self.id
            ),
            ElementKind::MeasurementLine => debug_assert!(
                self.points.is_empty()
                    || (self.points.len() == 2 && self.points[0].frame == self.points[1].frame),
                "measurement line {} has an invalid point set",
                self.id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_tags_round_trip_case_insensitively() {
        assert_eq!(ElementKind::from_tag("track"), Some(ElementKind::Track));
        assert_eq!(
            ElementKind::from_tag("Measurement_Line"),
            Some(ElementKind::MeasurementLine)
        );
        assert_eq!(ElementKind::from_tag("polygon"), None);

        for mode in VisibilityMode::ALL {
            assert_eq!(VisibilityMode::from_tag(&mode.tag().to_lowercase()), Some(mode));
        }
        assert_eq!(VisibilityMode::from_tag("sometimes"), None);
    }

    #[test]
    fn test_visibility_predicate() {
        assert!(!VisibilityMode::Hidden.shows(5, 5));
        assert!(VisibilityMode::HomeFrame.shows(5, 5));
        assert!(!VisibilityMode::HomeFrame.shows(5, 6));
        assert!(VisibilityMode::Incremental.shows(5, 5));
        assert!(VisibilityMode::Incremental.shows(5, 9));
        assert!(!VisibilityMode::Incremental.shows(5, 4));
        assert!(VisibilityMode::AlwaysVisible.shows(5, 0));
    }

    #[test]
    fn test_upsert_keeps_frames_sorted_and_unique() {
        let mut track = Element::new_track(1);
        assert_eq!(track.upsert_point(Point::new(9, 0.0, 1.0, 1.0)), None);
        assert_eq!(track.upsert_point(Point::new(2, 0.0, 2.0, 2.0)), None);
        assert_eq!(track.upsert_point(Point::new(5, 0.0, 3.0, 3.0)), None);

        let replaced = track.upsert_point(Point::new(5, 0.0, 4.0, 4.0));
        assert_eq!(replaced, Some(Point::new(5, 0.0, 3.0, 3.0)));

        let frames: Vec<usize> = track.points().iter().map(|p| p.frame).collect();
        assert_eq!(frames, vec![2, 5, 9]);
        assert_eq!(track.point_at(5).map(|p| p.x), Some(4.0));
        assert_eq!(track.first_frame(), Some(2));
        assert_eq!(track.last_frame(), Some(9));
    }

    #[test]
    fn test_remove_and_replace_missing_frame() {
        let mut track = Element::new_track(1);
        track.upsert_point(Point::new(3, 0.0, 1.0, 1.0));
        assert_eq!(track.remove_point(4), None);
        assert_eq!(track.replace_point(Point::new(4, 0.0, 0.0, 0.0)), None);
        assert!(track.remove_point(3).is_some());
        assert!(track.points().is_empty());
    }

    #[test]
    fn test_line_geometry() {
        let mut line = Element::new_line(2);
        assert_eq!(line.line_length_px(), None);
        assert_eq!(line.definition_frame(), None);

        line.commit_line(Point::new(7, 0.0, 0.0, 0.0), Point::new(7, 0.0, 30.0, -40.0));
        assert_eq!(line.definition_frame(), Some(7));
        assert_abs_diff_eq!(line.line_length_px().unwrap(), 50.0);
        assert!(line.line_angle_deg().unwrap() > 0.0 && line.line_angle_deg().unwrap() < 90.0);
        assert!(line.analysis().is_none());
    }

    #[test]
    fn test_default_names() {
        assert_eq!(Element::new_track(3).name, "Track 3");
        assert_eq!(Element::new_line(4).name, "Line 4");
    }
}
