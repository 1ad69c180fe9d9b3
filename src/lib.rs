// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! frametrack - point tracks and measurement lines over video frames.
//!
//! The [`ElementStore`] holds every annotation of a session, runs the
//! two-click definition of measurement lines, keeps a single level of undo
//! for track point edits and resolves what is visible on each frame.
//! Project files are read and written through [`io`].

pub mod config;
pub mod io;
pub mod models;
pub mod store;
pub mod util;
pub mod view;

pub use config::OverlaySettings;
pub use models::{Element, ElementKind, Point, ProjectData, VideoMetadata, VisibilityMode};
pub use store::{ElementStore, StoreEvent};
pub use view::VisualDirective;
