// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project file contents.
//!
//! A project pairs the metadata of the annotated video with the element
//! records. Elements are kept as loose JSON values so that a damaged record
//! only costs that record when loading, not the whole file.

use crate::io::records::{self, LoadReport};
use crate::store::ElementStore;
use serde::{Deserialize, Serialize};

/// The video the annotations were made on.
///
/// Also serves as the validation context when loading elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoMetadata {
    pub video_filename: Option<String>,
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub fps: f64,
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            video_filename: None,
            width: 0,
            height: 0,
            frame_count: 0,
            fps: 0.0,
        }
    }
}

impl VideoMetadata {
    pub fn new(width: u32, height: u32, frame_count: usize, fps: f64) -> Self {
        Self {
            video_filename: None,
            width,
            height,
            frame_count,
            fps,
        }
    }

    /// Whether points can be validated against this video at all.
    pub fn is_usable(&self) -> bool {
        self.width > 0 && self.height > 0 && self.frame_count > 0
    }
}

/// Complete project data for serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub metadata: VideoMetadata,
    #[serde(default)]
    pub elements: Vec<serde_json::Value>,
}

impl ProjectData {
    /// Gather the store's elements into a project for the given video.
    pub fn from_store(store: &ElementStore, metadata: VideoMetadata) -> Self {
        let elements = records::to_records(store)
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            // Records are plain structs of strings and numbers.
            .unwrap_or_else(|e| {
                log::error!("Failed to convert element records: {}", e);
                Vec::new()
            });

        Self { metadata, elements }
    }

    /// Replace the store's contents with this project's elements.
    pub fn apply_to_store(&self, store: &mut ElementStore) -> LoadReport {
        let mut report = records::load_from(store, &self.elements, &self.metadata);
        if !self.metadata.is_usable() {
            report.warnings.insert(
                0,
                format!(
                    "Video context for element validation is invalid ({}x{}, {} frames). Point validation may be unreliable.",
                    self.metadata.width, self.metadata.height, self.metadata.frame_count
                ),
            );
        }
        report
    }
}
