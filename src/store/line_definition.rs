// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Two-click definition of a measurement line.
//!
//! The first accepted click fixes the frame; the second click must land on
//! that same frame to commit the line. A click on any other frame is
//! rejected and the definition stays open.

use crate::models::Point;

/// Progress of the measurement line being defined, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineDefinition {
    #[default]
    Idle,
    AwaitingFirstPoint {
        element_id: u32,
    },
    AwaitingSecondPoint {
        element_id: u32,
        first_point: Point,
        frame: usize,
    },
}

/// Outcome of feeding a click to [`LineDefinition::accept_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineStep {
    /// First endpoint stored, frame now locked.
    FirstPointStored,
    /// Both endpoints known; the definition is back to idle.
    Committed { first: Point, second: Point },
    /// Second click on the wrong frame; nothing changed.
    FrameMismatch { expected: usize, got: usize },
    /// No definition in progress.
    NotDefining,
}

impl LineDefinition {
    /// Start defining the line with the given element id.
    pub fn begin(&mut self, element_id: u32) {
        *self = LineDefinition::AwaitingFirstPoint { element_id };
    }

    pub fn reset(&mut self) {
        *self = LineDefinition::Idle;
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, LineDefinition::Idle)
    }

    /// Id of the element being defined.
    pub fn element_id(&self) -> Option<u32> {
        match *self {
            LineDefinition::Idle => None,
            LineDefinition::AwaitingFirstPoint { element_id }
            | LineDefinition::AwaitingSecondPoint { element_id, .. } => Some(element_id),
        }
    }

    /// Whether `element_id` is the line currently being defined.
    pub fn is_defining(&self, element_id: u32) -> bool {
        self.element_id() == Some(element_id)
    }

    pub fn first_point(&self) -> Option<Point> {
        match *self {
            LineDefinition::AwaitingSecondPoint { first_point, .. } => Some(first_point),
            _ => None,
        }
    }

    /// Frame the definition is locked to, once the first point is in.
    pub fn locked_frame(&self) -> Option<usize> {
        match *self {
            LineDefinition::AwaitingSecondPoint { frame, .. } => Some(frame),
            _ => None,
        }
    }

    pub fn accept_point(&mut self, point: Point) -> LineStep {
        match *self {
            LineDefinition::Idle => LineStep::NotDefining,
            LineDefinition::AwaitingFirstPoint { element_id } => {
                *self = LineDefinition::AwaitingSecondPoint {
                    element_id,
                    first_point: point,
                    frame: point.frame,
                };
                LineStep::FirstPointStored
            }
            LineDefinition::AwaitingSecondPoint {
                first_point, frame, ..
            } => {
                if point.frame != frame {
                    return LineStep::FrameMismatch {
                        expected: frame,
                        got: point.frame,
                    };
                }
                *self = LineDefinition::Idle;
                LineStep::Committed {
                    first: first_point,
                    second: point,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_definition() {
        let mut def = LineDefinition::default();
        assert!(def.is_idle());
        assert_eq!(def.accept_point(Point::new(1, 0.0, 0.0, 0.0)), LineStep::NotDefining);

        def.begin(3);
        assert!(def.is_defining(3));
        assert_eq!(def.locked_frame(), None);

        let first = Point::new(10, 400.0, 5.0, 5.0);
        assert_eq!(def.accept_point(first), LineStep::FirstPointStored);
        assert_eq!(def.locked_frame(), Some(10));
        assert_eq!(def.first_point(), Some(first));

        let second = Point::new(10, 400.0, 50.0, 5.0);
        assert_eq!(def.accept_point(second), LineStep::Committed { first, second });
        assert!(def.is_idle());
    }

    #[test]
    fn test_wrong_frame_keeps_definition_open() {
        let mut def = LineDefinition::default();
        def.begin(1);
        def.accept_point(Point::new(10, 0.0, 5.0, 5.0));
        let before = def;

        assert_eq!(
            def.accept_point(Point::new(11, 0.0, 50.0, 5.0)),
            LineStep::FrameMismatch { expected: 10, got: 11 }
        );
        assert_eq!(def, before);

        // Retry on the right frame goes through
        assert!(matches!(
            def.accept_point(Point::new(10, 0.0, 50.0, 5.0)),
            LineStep::Committed { .. }
        ));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut def = LineDefinition::default();
        def.begin(7);
        def.accept_point(Point::new(2, 0.0, 1.0, 1.0));
        def.reset();
        assert!(def.is_idle());
        assert_eq!(def.element_id(), None);
    }
}
