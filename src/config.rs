// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay settings.
//!
//! These control hit testing and how measurement line labels are
//! decorated. They can be stored next to a project as YAML or JSON.

use crate::io::serialization;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default pick radius around a drawn point, in pixels.
pub const DEFAULT_CLICK_TOLERANCE_PX: f64 = 10.0;

/// Settings consulted by the element store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    pub click_tolerance_px: f64,
    pub show_measurement_line_lengths: bool,
    pub line_length_font_size: u32,
    pub line_length_text_color: String,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            click_tolerance_px: DEFAULT_CLICK_TOLERANCE_PX,
            show_measurement_line_lengths: true,
            line_length_font_size: 10,
            line_length_text_color: "#FFFF00".to_string(),
        }
    }
}

impl OverlaySettings {
    /// Squared pick radius used by the hit queries.
    pub fn click_tolerance_sq(&self) -> f64 {
        self.click_tolerance_px * self.click_tolerance_px
    }

    /// Load settings from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = serialization::import_file(path)?;
        log::info!("Loaded overlay settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a `.yaml`, `.yml` or `.json` file.
    pub fn save(&self, path: &Path) -> Result<()> {
        serialization::export_file(self, path)
    }
}
