// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Per-track trajectory fit state.
//!
//! Tracks carry the settings and results of the last parabolic fit run
//! against them. The store does no fitting itself; it only keeps this state
//! consistent with the track's points.

use serde::{Deserialize, Serialize};

/// Standard gravity, used as the default fit constant.
pub const STANDARD_GRAVITY_MS2: f64 = 9.80665;

/// Inputs chosen for a track's fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSettings {
    pub g_value_ms2: f64,
    /// Optional (start, end) time window in seconds.
    pub time_range_s: Option<(f64, f64)>,
    pub excluded_point_frames: Vec<usize>,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            g_value_ms2: STANDARD_GRAVITY_MS2,
            time_range_s: None,
            excluded_point_frames: Vec::new(),
        }
    }
}

/// Outputs of a track's fit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitResults {
    /// (A, B, C) for y = At^2 + Bt + C.
    pub coefficients_poly2: Option<(f64, f64, f64)>,
    pub r_squared: Option<f64>,
    pub derived_scale_m_per_px: Option<f64>,
    pub is_applied_to_project: bool,
}

/// Fit settings and results attached to a track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisState {
    pub fit_settings: FitSettings,
    pub fit_results: FitResults,
}

impl AnalysisState {
    /// Whether a fit result is currently stored.
    pub fn has_fit(&self) -> bool {
        self.fit_results.coefficients_poly2.is_some()
    }

    /// Drop the fit results after the underlying points changed.
    ///
    /// Returns true if there was a fit to drop. `is_applied_to_project` is
    /// left alone.
    pub fn invalidate_fit(&mut self) -> bool {
        if !self.has_fit() {
            return false;
        }
        self.fit_results.coefficients_poly2 = None;
        self.fit_results.r_squared = None;
        self.fit_results.derived_scale_m_per_px = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_has_no_fit() {
        let state = AnalysisState::default();
        assert!(!state.has_fit());
        assert_eq!(state.fit_settings.g_value_ms2, STANDARD_GRAVITY_MS2);
        assert!(state.fit_settings.excluded_point_frames.is_empty());
    }

    #[test]
    fn test_invalidate_keeps_applied_flag() {
        let mut state = AnalysisState::default();
        state.fit_results.coefficients_poly2 = Some((1.0, 2.0, 3.0));
        state.fit_results.r_squared = Some(0.98);
        state.fit_results.derived_scale_m_per_px = Some(0.01);
        state.fit_results.is_applied_to_project = true;

        assert!(state.invalidate_fit());
        assert!(!state.has_fit());
        assert_eq!(state.fit_results.r_squared, None);
        assert_eq!(state.fit_results.derived_scale_m_per_px, None);
        assert!(state.fit_results.is_applied_to_project);

        // Nothing left to drop
        assert!(!state.invalidate_fit());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let state: AnalysisState =
            serde_json::from_str(r#"{"fit_results": {"r_squared": 0.5}}"#).unwrap();
        assert_eq!(state.fit_results.r_squared, Some(0.5));
        assert_eq!(state.fit_settings, FitSettings::default());
    }
}
