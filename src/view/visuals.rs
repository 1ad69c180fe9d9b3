// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-frame draw directives for the annotation overlay.
//!
//! [`resolve`] decides which markers, segments and labels are visible on a
//! given frame. It does not draw anything; the renderer maps the directives
//! to pixels, including where a length label sits relative to its line.

use super::display::LengthFormatter;
use crate::models::{Element, ElementKind, VisibilityMode};

/// Whether a directive belongs to the active element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Active,
    Inactive,
}

impl Emphasis {
    fn for_element(index: usize, active: Option<usize>) -> Self {
        if active == Some(index) {
            Emphasis::Active
        } else {
            Emphasis::Inactive
        }
    }
}

/// Whether a marker sits on the frame being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    Current,
    Other,
}

/// What a segment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Connects consecutive visible points of a track.
    TrackPath,
    MeasurementLine,
}

/// One thing to draw on the current frame.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualDirective {
    Marker {
        element_id: u32,
        frame: usize,
        pos: (f64, f64),
        emphasis: Emphasis,
        role: MarkerRole,
    },
    Segment {
        element_id: u32,
        kind: SegmentKind,
        p1: (f64, f64),
        p2: (f64, f64),
        emphasis: Emphasis,
    },
    /// Length text for a measurement line, anchored on its endpoints.
    LengthLabel {
        element_id: u32,
        text: String,
        line_p1: (f64, f64),
        line_p2: (f64, f64),
        font_size: u32,
        color: String,
        emphasis: Emphasis,
    },
}

impl VisualDirective {
    pub fn element_id(&self) -> u32 {
        match self {
            VisualDirective::Marker { element_id, .. }
            | VisualDirective::Segment { element_id, .. }
            | VisualDirective::LengthLabel { element_id, .. } => *element_id,
        }
    }

    pub fn emphasis(&self) -> Emphasis {
        match self {
            VisualDirective::Marker { emphasis, .. }
            | VisualDirective::Segment { emphasis, .. }
            | VisualDirective::LengthLabel { emphasis, .. } => *emphasis,
        }
    }
}

/// How to decorate measurement lines with their length.
pub struct LabelOptions<'a> {
    pub formatter: &'a dyn LengthFormatter,
    pub font_size: u32,
    pub color: String,
}

/// Compute the directives for `frame`.
///
/// Hidden elements produce nothing. Emphasis only styles directives; the
/// active element is never filtered in or out because of it.
pub fn resolve(
    frame: usize,
    elements: &[Element],
    active: Option<usize>,
    labels: Option<&LabelOptions<'_>>,
) -> Vec<VisualDirective> {
    let mut directives = Vec::new();

    for (index, element) in elements.iter().enumerate() {
        if !element.is_visible() {
            continue;
        }
        let emphasis = Emphasis::for_element(index, active);
        match element.kind() {
            ElementKind::Track => track_directives(frame, element, emphasis, &mut directives),
            ElementKind::MeasurementLine => {
                line_directives(frame, element, emphasis, labels, &mut directives)
            }
        }
    }

    directives
}

fn track_directives(
    frame: usize,
    track: &Element,
    emphasis: Emphasis,
    out: &mut Vec<VisualDirective>,
) {
    let mode = track.visibility;
    let connect = mode != VisibilityMode::HomeFrame;
    let mut previous: Option<(f64, f64)> = None;

    for point in track.points().iter().filter(|p| mode.shows(p.frame, frame)) {
        let role = if point.frame == frame {
            MarkerRole::Current
        } else {
            MarkerRole::Other
        };
        out.push(VisualDirective::Marker {
            element_id: track.id,
            frame: point.frame,
            pos: point.position(),
            emphasis,
            role,
        });
        if connect {
            if let Some(p1) = previous {
                out.push(VisualDirective::Segment {
                    element_id: track.id,
                    kind: SegmentKind::TrackPath,
                    p1,
                    p2: point.position(),
                    emphasis,
                });
            }
        }
        previous = Some(point.position());
    }
}

fn line_directives(
    frame: usize,
    line: &Element,
    emphasis: Emphasis,
    labels: Option<&LabelOptions<'_>>,
    out: &mut Vec<VisualDirective>,
) {
    // Lines still being defined have no points and draw nothing here
    let Some((a, b)) = line.line_endpoints() else {
        return;
    };
    if !line.visibility.shows(a.frame, frame) {
        return;
    }

    out.push(VisualDirective::Segment {
        element_id: line.id,
        kind: SegmentKind::MeasurementLine,
        p1: a.position(),
        p2: b.position(),
        emphasis,
    });

    if let (Some(options), Some(length)) = (labels, line.line_length_px()) {
        out.push(VisualDirective::LengthLabel {
            element_id: line.id,
            text: options.formatter.format_length(length).to_string(),
            line_p1: a.position(),
            line_p2: b.position(),
            font_size: options.font_size,
            color: options.color.clone(),
            emphasis,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Point, VisibilityMode};
    use crate::view::display::PixelLengths;

    fn track_with_frames(id: u32, frames: &[usize], mode: VisibilityMode) -> Element {
        let mut track = Element::new_track(id);
        track.visibility = mode;
        for &f in frames {
            track.upsert_point(Point::new(f, f as f64 * 40.0, f as f64, f as f64 * 2.0));
        }
        track
    }

    fn line_on_frame(id: u32, frame: usize, mode: VisibilityMode) -> Element {
        let mut line = Element::new_line(id);
        line.visibility = mode;
        line.commit_line(Point::new(frame, 0.0, 0.0, 0.0), Point::new(frame, 0.0, 30.0, 40.0));
        line
    }

    fn markers(directives: &[VisualDirective]) -> Vec<(usize, MarkerRole)> {
        directives
            .iter()
            .filter_map(|d| match d {
                VisualDirective::Marker { frame, role, .. } => Some((*frame, *role)),
                _ => None,
            })
            .collect()
    }

    fn segment_count(directives: &[VisualDirective]) -> usize {
        directives
            .iter()
            .filter(|d| matches!(d, VisualDirective::Segment { .. }))
            .count()
    }

    #[test]
    fn test_incremental_track() {
        let elements = vec![track_with_frames(1, &[2, 5, 9], VisibilityMode::Incremental)];

        let at_5 = resolve(5, &elements, None, None);
        assert_eq!(
            markers(&at_5),
            vec![(2, MarkerRole::Other), (5, MarkerRole::Current)]
        );
        assert_eq!(segment_count(&at_5), 1);

        assert!(resolve(1, &elements, None, None).is_empty());

        let at_9 = resolve(9, &elements, None, None);
        assert_eq!(markers(&at_9).len(), 3);
        assert_eq!(markers(&at_9)[2], (9, MarkerRole::Current));
        assert_eq!(segment_count(&at_9), 2);
    }

    #[test]
    fn test_segments_join_consecutive_points() {
        let elements = vec![track_with_frames(1, &[2, 5], VisibilityMode::Incremental)];
        let at_5 = resolve(5, &elements, None, None);
        assert!(at_5.contains(&VisualDirective::Segment {
            element_id: 1,
            kind: SegmentKind::TrackPath,
            p1: (2.0, 4.0),
            p2: (5.0, 10.0),
            emphasis: Emphasis::Inactive,
        }));
    }

    #[test]
    fn test_home_frame_track_has_no_segments() {
        let elements = vec![track_with_frames(1, &[2, 5, 9], VisibilityMode::HomeFrame)];

        let at_5 = resolve(5, &elements, None, None);
        assert_eq!(markers(&at_5), vec![(5, MarkerRole::Current)]);
        assert_eq!(segment_count(&at_5), 0);
        assert!(resolve(6, &elements, None, None).is_empty());
    }

    #[test]
    fn test_always_visible_track_ignores_frame_ceiling() {
        let elements = vec![track_with_frames(1, &[2, 5, 9], VisibilityMode::AlwaysVisible)];
        let at_0 = resolve(0, &elements, None, None);
        assert_eq!(markers(&at_0).len(), 3);
        assert!(markers(&at_0).iter().all(|(_, role)| *role == MarkerRole::Other));
        assert_eq!(segment_count(&at_0), 2);
    }

    #[test]
    fn test_hidden_elements_are_skipped() {
        let elements = vec![
            track_with_frames(1, &[0, 1], VisibilityMode::Hidden),
            line_on_frame(2, 0, VisibilityMode::Hidden),
        ];
        assert!(resolve(1, &elements, Some(0), None).is_empty());
    }

    #[test]
    fn test_line_visibility_modes() {
        let home = vec![line_on_frame(1, 7, VisibilityMode::HomeFrame)];
        let incremental = vec![line_on_frame(1, 7, VisibilityMode::Incremental)];
        let always = vec![line_on_frame(1, 7, VisibilityMode::AlwaysVisible)];

        for frame in 0..20 {
            assert_eq!(!resolve(frame, &home, None, None).is_empty(), frame == 7);
            assert_eq!(!resolve(frame, &incremental, None, None).is_empty(), frame >= 7);
            assert_eq!(resolve(frame, &always, None, None).len(), 1);
        }
    }

    #[test]
    fn test_undefined_line_draws_nothing() {
        let mut line = Element::new_line(1);
        line.visibility = VisibilityMode::AlwaysVisible;
        assert!(resolve(0, &[line], Some(0), None).is_empty());
    }

    #[test]
    fn test_line_label() {
        let elements = vec![line_on_frame(4, 3, VisibilityMode::Incremental)];
        let options = LabelOptions {
            formatter: &PixelLengths,
            font_size: 12,
            color: "#00FF00".to_string(),
        };

        let directives = resolve(3, &elements, Some(0), Some(&options));
        assert_eq!(directives.len(), 2);
        assert_eq!(
            directives[1],
            VisualDirective::LengthLabel {
                element_id: 4,
                text: "50.0 px".to_string(),
                line_p1: (0.0, 0.0),
                line_p2: (30.0, 40.0),
                font_size: 12,
                color: "#00FF00".to_string(),
                emphasis: Emphasis::Active,
            }
        );
    }

    #[test]
    fn test_emphasis_follows_active_index() {
        let elements = vec![
            track_with_frames(1, &[0], VisibilityMode::Incremental),
            track_with_frames(2, &[0], VisibilityMode::Incremental),
        ];
        let directives = resolve(0, &elements, Some(1), None);
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].emphasis(), Emphasis::Inactive);
        assert_eq!(directives[1].emphasis(), Emphasis::Active);
        assert_eq!(directives[1].element_id(), 2);

        let none_active = resolve(0, &elements, None, None);
        assert!(none_active.iter().all(|d| d.emphasis() == Emphasis::Inactive));
    }
}
