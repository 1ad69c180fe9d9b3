// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Formatting of lengths for measurement line labels.
//!
//! Unit conversion belongs to whoever owns the scale; the overlay only asks
//! for a ready-made string.

use std::fmt;

/// A length ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLength {
    pub value: String,
    pub unit: String,
}

impl fmt::Display for FormattedLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Maps a pixel length to display text.
pub trait LengthFormatter {
    fn format_length(&self, length_px: f64) -> FormattedLength;
}

/// Shows raw pixel lengths. Used when no scale is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelLengths;

impl LengthFormatter for PixelLengths {
    fn format_length(&self, length_px: f64) -> FormattedLength {
        FormattedLength {
            value: format!("{:.1}", length_px),
            unit: "px".to_string(),
        }
    }
}

impl<F> LengthFormatter for F
where
    F: Fn(f64) -> FormattedLength,
{
    fn format_length(&self, length_px: f64) -> FormattedLength {
        self(length_px)
    }
}
