// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! All coordinates here are in the top-left pixel frame of the video:
//! x grows to the right, y grows downwards.

/// Number of decimals kept for stored point coordinates.
pub const COORDINATE_DECIMALS: i32 = 3;

/// Round a pixel coordinate to the stored precision.
pub fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(COORDINATE_DECIMALS);
    (value * factor).round() / factor
}

/// Squared distance between two pixel positions.
pub fn distance_sq(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    dx * dx + dy * dy
}

/// Length of the segment from `a` to `b` in pixels.
pub fn segment_length(a: (f64, f64), b: (f64, f64)) -> f64 {
    distance_sq(a, b).sqrt()
}

/// Angle of the segment from `a` to `b` in degrees, in [0, 360).
///
/// Measured counter-clockwise from the +x axis as seen on screen, so the
/// y axis is flipped before taking the angle.
pub fn segment_angle_deg(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = a.1 - b.1;
    let angle = dy.atan2(dx).to_degrees().rem_euclid(360.0);
    // rem_euclid rounds tiny negative angles up to 360
    if angle >= 360.0 {
        0.0
    } else {
        angle
    }
}
