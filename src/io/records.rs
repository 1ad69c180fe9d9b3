// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Conversion between the element store and project file records.
//!
//! Saving is a straight mapping. Loading is lenient: a bad record or point
//! is skipped with a warning and everything else still loads. Records are
//! read as JSON values so that a wrongly typed field only affects its own
//! record.

use crate::models::{
    AnalysisState, Element, ElementKind, Point, VideoMetadata, VisibilityMode,
};
use crate::store::ElementStore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// A point as written to a project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub frame_index: usize,
    pub time_ms: f64,
    pub x: f64,
    pub y: f64,
}

impl From<&Point> for PointRecord {
    fn from(point: &Point) -> Self {
        Self {
            frame_index: point.frame,
            time_ms: point.time_ms,
            x: point.x,
            y: point.y,
        }
    }
}

/// An element as written to a project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub visibility_mode: String,
    pub data: Vec<PointRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_state: Option<AnalysisState>,
}

impl From<&Element> for ElementRecord {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id,
            kind: element.kind().tag().to_string(),
            name: element.name.clone(),
            visibility_mode: element.visibility.tag().to_string(),
            data: element.points().iter().map(PointRecord::from).collect(),
            analysis_state: element.analysis().cloned(),
        }
    }
}

/// Outcome of [`load_from`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Always true once the records could be iterated.
    pub success: bool,
    pub warnings: Vec<String>,
    pub loaded_elements: usize,
    pub loaded_points: usize,
    pub skipped_points: usize,
}

/// Records for every element, in store order.
pub fn to_records(store: &ElementStore) -> Vec<ElementRecord> {
    let records: Vec<ElementRecord> = store.elements().iter().map(ElementRecord::from).collect();
    log::info!("Prepared {} elements for saving", records.len());
    records
}

/// Reset `store` and fill it from project file records.
///
/// Points are checked against `video`: frame within the frame count, x and
/// y inside the frame. When the frame rate is known, a timestamp far from
/// the frame's nominal time is reported but kept.
pub fn load_from(store: &mut ElementStore, records: &[Value], video: &VideoMetadata) -> LoadReport {
    store.reset();

    let mut report = LoadReport {
        success: true,
        ..LoadReport::default()
    };
    let mut seen_ids = HashSet::new();

    for (position, record) in records.iter().enumerate() {
        if let Some(element) = load_element(position, record, video, &mut seen_ids, &mut report) {
            report.loaded_elements += 1;
            report.loaded_points += element.points().len();
            store.push_loaded(element);
        }
    }

    store.finish_load();
    log::info!(
        "Loaded {} element(s) with {} valid points, {} points skipped, {} warnings",
        report.loaded_elements,
        report.loaded_points,
        report.skipped_points,
        report.warnings.len()
    );
    report
}

fn warn(report: &mut LoadReport, message: String) {
    log::warn!("{}", message);
    report.warnings.push(message);
}

fn load_element(
    position: usize,
    record: &Value,
    video: &VideoMetadata,
    seen_ids: &mut HashSet<u32>,
    report: &mut LoadReport,
) -> Option<Element> {
    let Some(fields) = record.as_object() else {
        warn(report, format!("Skipping element record #{}: not an object", position + 1));
        return None;
    };
    let raw_name = fields.get("name").and_then(Value::as_str);

    let id = fields
        .get("id")
        .and_then(Value::as_u64)
        .filter(|&id| id > 0)
        .and_then(|id| u32::try_from(id).ok());
    let Some(id) = id else {
        warn(
            report,
            format!(
                "Skipping element due to missing or invalid ID: {}",
                raw_name.unwrap_or("Unknown")
            ),
        );
        return None;
    };
    let label = format!("Element ID {} ({})", id, raw_name.unwrap_or("unnamed"));

    if seen_ids.contains(&id) {
        warn(report, format!("Skipping {}: ID already used by another element", label));
        return None;
    }

    let kind = match fields.get("type").and_then(Value::as_str) {
        None => {
            warn(report, format!("Skipping {}: missing or invalid type", label));
            return None;
        }
        Some(tag) => match ElementKind::from_tag(tag) {
            Some(kind) => kind,
            None => {
                warn(report, format!("Skipping {}: unrecognized type '{}'", label, tag));
                return None;
            }
        },
    };

    let visibility = match fields.get("visibility_mode") {
        None | Some(Value::Null) => VisibilityMode::default(),
        Some(value) => match value.as_str().and_then(VisibilityMode::from_tag) {
            Some(mode) => mode,
            None => {
                warn(
                    report,
                    format!(
                        "{} has unrecognized visibility mode {}. Using default INCREMENTAL.",
                        label, value
                    ),
                );
                VisibilityMode::default()
            }
        },
    };

    let raw_points: &[Value] = match fields.get("data") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(points)) => points,
        Some(_) => {
            warn(report, format!("{}: point data is not a list, ignored", label));
            &[]
        }
    };

    let mut points = Vec::with_capacity(raw_points.len());
    for raw in raw_points {
        match parse_point(raw, id, video) {
            Ok((point, time_warning)) => {
                if let Some(message) = time_warning {
                    warn(report, message);
                }
                points.push(point);
            }
            Err(message) => {
                report.skipped_points += 1;
                warn(report, message);
            }
        }
    }

    let mut element = match kind {
        ElementKind::Track => {
            if points.is_empty() && !raw_points.is_empty() {
                warn(
                    report,
                    format!("{} had all its points skipped due to validation errors. It will be empty.", label),
                );
            }
            let mut track = Element::new_track(id);
            track.points = dedup_by_frame(points, &label, report);
            if let Some(analysis) = track.analysis_mut() {
                *analysis = load_analysis(fields.get("analysis_state"), &label, report);
            }
            track
        }
        ElementKind::MeasurementLine => {
            match points.as_slice() {
                [a, b] if a.frame == b.frame => {}
                [a, b] => {
                    warn(
                        report,
                        format!(
                            "Skipping {}: measurement line points must be on the same frame (found {} and {})",
                            label, a.frame, b.frame
                        ),
                    );
                    report.skipped_points += 2;
                    return None;
                }
                _ => {
                    warn(
                        report,
                        format!(
                            "Skipping {}: measurement line must have exactly 2 valid points, found {}",
                            label,
                            points.len()
                        ),
                    );
                    report.skipped_points += points.len();
                    return None;
                }
            }
            let mut line = Element::new_line(id);
            line.points = points;
            line
        }
    };

    if let Some(name) = raw_name.filter(|n| !n.is_empty()) {
        element.name = name.to_string();
    }
    element.visibility = visibility;
    seen_ids.insert(id);
    Some(element)
}

/// Sort track points by frame, keeping the last point given for a frame.
fn dedup_by_frame(points: Vec<Point>, label: &str, report: &mut LoadReport) -> Vec<Point> {
    let mut by_frame = BTreeMap::new();
    for point in points {
        if by_frame.insert(point.frame, point).is_some() {
            report.skipped_points += 1;
            warn(
                report,
                format!("{}: more than one point on frame {}, keeping the last", label, point.frame),
            );
        }
    }
    by_frame.into_values().collect()
}

/// Read a track's fit state key by key.
///
/// A bad key falls back to its default with a warning; the other keys keep
/// their stored values.
fn load_analysis(value: Option<&Value>, label: &str, report: &mut LoadReport) -> AnalysisState {
    let mut state = AnalysisState::default();
    let fields = match value {
        None | Some(Value::Null) => return state,
        Some(Value::Object(fields)) => fields,
        Some(_) => {
            warn(report, format!("{} had invalid 'analysis_state'. Using default.", label));
            return state;
        }
    };

    if let Some(settings) = analysis_section(fields, "fit_settings", label, report) {
        let target = &mut state.fit_settings;
        read_key(settings, "g_value_ms2", &mut target.g_value_ms2, label, report);
        read_key(settings, "time_range_s", &mut target.time_range_s, label, report);
        read_key(settings, "excluded_point_frames", &mut target.excluded_point_frames, label, report);
    }
    if let Some(results) = analysis_section(fields, "fit_results", label, report) {
        let target = &mut state.fit_results;
        read_key(results, "coefficients_poly2", &mut target.coefficients_poly2, label, report);
        read_key(results, "r_squared", &mut target.r_squared, label, report);
        read_key(results, "derived_scale_m_per_px", &mut target.derived_scale_m_per_px, label, report);
        read_key(results, "is_applied_to_project", &mut target.is_applied_to_project, label, report);
    }
    state
}

fn analysis_section<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
    label: &str,
    report: &mut LoadReport,
) -> Option<&'a Map<String, Value>> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Object(section)) => Some(section),
        Some(other) => {
            warn(report, format!("{} had invalid '{}' ({}). Using defaults.", label, key, other));
            None
        }
    }
}

fn read_key<T: DeserializeOwned>(
    section: &Map<String, Value>,
    key: &str,
    target: &mut T,
    label: &str,
    report: &mut LoadReport,
) {
    let Some(raw) = section.get(key) else {
        return;
    };
    match serde_json::from_value(raw.clone()) {
        Ok(value) => *target = value,
        Err(e) => warn(report, format!("{} had unreadable '{}' ({}). Using default.", label, key, e)),
    }
}

/// Validate one point record.
///
/// Returns the point and an optional timing warning, or the reason the
/// point was dropped.
fn parse_point(
    raw: &Value,
    element_id: u32,
    video: &VideoMetadata,
) -> Result<(Point, Option<String>), String> {
    let field = |key: &str| raw.get(key).and_then(Value::as_f64);
    let frame_label = raw
        .get("frame_index")
        .map_or_else(|| "?".to_string(), Value::to_string);
    let description = format!("Point in element ID {} (F{})", element_id, frame_label);

    let (Some(frame), Some(time_ms), Some(x), Some(y)) = (
        field("frame_index"),
        field("time_ms"),
        field("x"),
        field("y"),
    ) else {
        return Err(format!(
            "{}: contains invalid or missing coordinate/frame/time data. Skipped.",
            description
        ));
    };

    if frame.fract() != 0.0 || frame < 0.0 || frame >= video.frame_count as f64 {
        return Err(format!(
            "{}: frame index ({}) out of video range [0, {}). Skipped.",
            description, frame, video.frame_count
        ));
    }
    if !(0.0..f64::from(video.width)).contains(&x) {
        return Err(format!(
            "{}: X-coordinate ({:.2}) out of video width [0, {}). Skipped.",
            description, x, video.width
        ));
    }
    if !(0.0..f64::from(video.height)).contains(&y) {
        return Err(format!(
            "{}: Y-coordinate ({:.2}) out of video height [0, {}). Skipped.",
            description, y, video.height
        ));
    }

    let frame = frame as usize;
    let mut time_warning = None;
    if video.fps > 0.0 {
        let expected_ms = frame as f64 / video.fps * 1000.0;
        let tolerance_ms = (500.0 / video.fps).max(50.0);
        if (time_ms - expected_ms).abs() > tolerance_ms {
            time_warning = Some(format!(
                "{}: time ({:.1}ms) seems inconsistent with frame index and FPS (expected ~{:.1}ms). Using file time.",
                description, time_ms, expected_ms
            ));
        }
    }

    Ok((Point::new(frame, time_ms, x, y), time_warning))
}
