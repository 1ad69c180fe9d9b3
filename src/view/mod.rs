// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! What the overlay shows on each frame.

pub mod display;
pub mod visuals;

pub use display::{FormattedLength, LengthFormatter, PixelLengths};
pub use visuals::{Emphasis, LabelOptions, MarkerRole, SegmentKind, VisualDirective};
