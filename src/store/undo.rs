// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Single-level undo for track point edits.
//!
//! Only the most recent point edit can be reverted. Recording a new edit
//! replaces the pending one; there is no redo.

use crate::models::Point;

/// Inverse information for one track point edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UndoRecord {
    PointAdded {
        element_index: usize,
        frame: usize,
    },
    PointModified {
        element_index: usize,
        frame: usize,
        previous: Point,
    },
    PointDeleted {
        element_index: usize,
        frame: usize,
        deleted: Point,
    },
}

impl UndoRecord {
    pub fn element_index(&self) -> usize {
        match *self {
            UndoRecord::PointAdded { element_index, .. }
            | UndoRecord::PointModified { element_index, .. }
            | UndoRecord::PointDeleted { element_index, .. } => element_index,
        }
    }

    pub fn frame(&self) -> usize {
        match *self {
            UndoRecord::PointAdded { frame, .. }
            | UndoRecord::PointModified { frame, .. }
            | UndoRecord::PointDeleted { frame, .. } => frame,
        }
    }
}

/// Holds at most one pending [`UndoRecord`].
#[derive(Debug, Default)]
pub struct UndoBuffer {
    pending: Option<UndoRecord>,
}

impl UndoBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending record.
    pub fn record(&mut self, record: UndoRecord) {
        self.pending = Some(record);
    }

    pub fn pending(&self) -> Option<&UndoRecord> {
        self.pending.as_ref()
    }

    /// Remove and return the pending record.
    pub fn take(&mut self) -> Option<UndoRecord> {
        self.pending.take()
    }

    /// Drop the pending record. Returns true if there was one.
    pub fn clear(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holds_only_latest_record() {
        let mut buffer = UndoBuffer::new();
        assert!(buffer.is_empty());

        buffer.record(UndoRecord::PointAdded { element_index: 0, frame: 1 });
        buffer.record(UndoRecord::PointDeleted {
            element_index: 2,
            frame: 4,
            deleted: Point::new(4, 160.0, 1.0, 2.0),
        });

        let record = buffer.take().unwrap();
        assert_eq!(record.element_index(), 2);
        assert_eq!(record.frame(), 4);
        // The earlier record is gone, not stacked
        assert!(buffer.take().is_none());
    }

    #[test]
    fn test_clear_reports_whether_anything_was_pending() {
        let mut buffer = UndoBuffer::new();
        assert!(!buffer.clear());
        buffer.record(UndoRecord::PointAdded { element_index: 0, frame: 0 });
        assert!(buffer.pending().is_some());
        assert!(buffer.clear());
        assert!(buffer.is_empty());
    }
}
