// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! frametrack - inspect an annotation project file.
//!
//! Loads a project into an element store the same way the editor does,
//! reports every validation warning and prints what survived.

use anyhow::{bail, Result};
use frametrack::io::serialization;
use frametrack::view::{LengthFormatter, PixelLengths};
use frametrack::{ElementKind, ElementStore, OverlaySettings};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let Some(project_path) = args.next().map(PathBuf::from) else {
        bail!("Usage: frametrack <project.json|project.yaml> [settings.yaml]");
    };
    let settings = match args.next().map(PathBuf::from) {
        Some(path) => OverlaySettings::load(&path)?,
        None => OverlaySettings::default(),
    };

    let project = serialization::load_project(&project_path)?;
    let mut store = ElementStore::with_settings(settings);
    let report = project.apply_to_store(&mut store);

    for warning in &report.warnings {
        log::warn!("{}", warning);
    }

    let meta = &project.metadata;
    println!(
        "{}: {}x{}, {} frames at {:.3} fps",
        meta.video_filename.as_deref().unwrap_or("<unnamed video>"),
        meta.width,
        meta.height,
        meta.frame_count,
        meta.fps
    );
    println!(
        "{} element(s) loaded, {} point(s) skipped, {} warning(s)",
        report.loaded_elements,
        report.skipped_points,
        report.warnings.len()
    );

    for summary in store.track_summaries() {
        match (summary.first_frame, summary.last_frame) {
            (Some(first), Some(last)) => println!(
                "  Track {:>4}: {:>5} points, frames {}..={}",
                summary.id, summary.point_count, first, last
            ),
            _ => println!("  Track {:>4}: empty", summary.id),
        }
    }

    for line in store.elements_of_kind(ElementKind::MeasurementLine) {
        if let (Some(frame), Some(length), Some(angle)) = (
            line.definition_frame(),
            line.line_length_px(),
            line.line_angle_deg(),
        ) {
            println!(
                "  Line  {:>4}: frame {}, length {}, angle {:.1} deg",
                line.id,
                frame,
                PixelLengths.format_length(length),
                angle
            );
        }
    }

    Ok(())
}
