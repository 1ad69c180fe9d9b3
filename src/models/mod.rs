// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for tracks, measurement lines and project files.

pub mod analysis;
pub mod element;
pub mod project;

pub use analysis::{AnalysisState, FitResults, FitSettings};
pub use element::{Element, ElementKind, ElementPayload, Point, VisibilityMode, UNKNOWN_TIME_MS};
pub use project::{ProjectData, VideoMetadata};
