// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for project and settings files.

pub mod records;
pub mod serialization;

pub use records::{load_from, to_records, ElementRecord, LoadReport, PointRecord};
