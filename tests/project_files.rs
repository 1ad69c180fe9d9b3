// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

use frametrack::io::serialization::{load_project, save_project};
use frametrack::{ElementStore, OverlaySettings, ProjectData, VideoMetadata, VisibilityMode};
use std::fs;

fn video() -> VideoMetadata {
    VideoMetadata {
        video_filename: Some("drop_test.mp4".to_string()),
        ..VideoMetadata::new(1280, 720, 300, 30.0)
    }
}

fn sample_store() -> ElementStore {
    let mut store = ElementStore::new();
    store.create_track();
    for frame in [0usize, 3, 6, 9] {
        let time_ms = frame as f64 * 1000.0 / 30.0;
        store.add_point(frame, time_ms, 100.0 + frame as f64 * 10.5, 400.0 - frame as f64 * 3.25);
    }
    store.set_visibility_mode(0, VisibilityMode::HomeFrame);

    store.create_line();
    store.add_point(12, 400.0, 10.0, 10.0);
    store.add_point(12, 400.0, 210.0, 160.0);

    store.create_track();
    store
}

#[test]
fn test_json_project_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    let store = sample_store();

    save_project(&ProjectData::from_store(&store, video()), &path).unwrap();
    let project = load_project(&path).unwrap();
    assert_eq!(project.metadata, video());

    let mut reloaded = ElementStore::new();
    let report = project.apply_to_store(&mut reloaded);
    assert!(report.success);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(reloaded.elements(), store.elements());
}

#[test]
fn test_yaml_project_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.yaml");
    let store = sample_store();

    save_project(&ProjectData::from_store(&store, video()), &path).unwrap();
    let mut reloaded = ElementStore::new();
    let report = load_project(&path).unwrap().apply_to_store(&mut reloaded);

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(reloaded.elements(), store.elements());
}

#[test]
fn test_smaller_video_drops_out_of_frame_points() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("project.json");
    save_project(&ProjectData::from_store(&sample_store(), video()), &path).unwrap();

    let mut project = load_project(&path).unwrap();
    // Only the first track point (x = 100) still fits
    project.metadata.width = 110;
    let mut reloaded = ElementStore::new();
    let report = project.apply_to_store(&mut reloaded);

    assert!(report.success);
    assert_eq!(reloaded.element(0).unwrap().points().len(), 1);
    // Line end at x = 210 falls out, so the line is dropped with its other point
    assert_eq!(reloaded.len(), 2);
    assert_eq!(report.skipped_points, 5);
}

#[test]
fn test_damaged_elements_still_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("damaged.json");
    fs::write(
        &path,
        r#"{
            "metadata": {"width": 640, "height": 480, "frame_count": 50, "fps": 25.0},
            "elements": [
                {"id": "one", "type": "TRACK"},
                {"id": 2, "type": "TRACK", "visibility_mode": 5,
                 "data": [{"frame_index": 1, "time_ms": 40.0, "x": 3.0, "y": 4.0},
                          {"frame_index": 2, "time_ms": "late", "x": 3.0, "y": 4.0}]},
                {"id": 3, "type": "MEASUREMENT_LINE", "data": "nope"}
            ]
        }"#,
    )
    .unwrap();

    let mut store = ElementStore::new();
    let report = load_project(&path).unwrap().apply_to_store(&mut store);

    assert!(report.success);
    assert_eq!(store.len(), 1);
    assert_eq!(store.element(0).unwrap().id, 2);
    assert_eq!(store.visibility_mode(0), VisibilityMode::Incremental);
    assert_eq!(store.element(0).unwrap().points().len(), 1);
    // bad id, bad visibility, bad point, non-list data, line without points
    assert_eq!(report.warnings.len(), 5);
}

#[test]
fn test_unreadable_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    assert!(load_project(&broken).is_err());

    let wrong_ext = dir.path().join("project.txt");
    fs::write(&wrong_ext, "{}").unwrap();
    assert!(load_project(&wrong_ext).is_err());

    assert!(load_project(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_settings_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overlay.yml");
    let settings = OverlaySettings {
        click_tolerance_px: 6.0,
        show_measurement_line_lengths: false,
        ..OverlaySettings::default()
    };

    settings.save(&path).unwrap();
    assert_eq!(OverlaySettings::load(&path).unwrap(), settings);
}
