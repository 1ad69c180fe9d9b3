// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! This module handles exporting and importing project and settings files
//! in YAML and JSON formats. The format follows the file extension.

use crate::models::project::ProjectData;
use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// On-disk file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            _ => bail!("Unsupported file extension: {:?}", extension),
        }
    }
}

/// Export data to YAML format.
pub fn export_yaml<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Export data to JSON format.
pub fn export_json<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Import data from YAML format.
pub fn import_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = serde_yaml::from_str(&yaml)
        .with_context(|| format!("Failed to parse YAML in {}", path.display()))?;
    Ok(data)
}

/// Import data from JSON format.
pub fn import_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;
    Ok(data)
}

/// Export data in the format named by the path's extension.
pub fn export_file<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    match FileFormat::from_path(path)? {
        FileFormat::Yaml => export_yaml(data, path),
        FileFormat::Json => export_json(data, path),
    }
}

/// Import data in the format named by the path's extension.
pub fn import_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    match FileFormat::from_path(path)? {
        FileFormat::Yaml => import_yaml(path),
        FileFormat::Json => import_json(path),
    }
}

/// Write a project file.
pub fn save_project(data: &ProjectData, path: &Path) -> Result<()> {
    export_file(data, path)?;
    log::info!(
        "Saved project with {} elements to {}",
        data.elements.len(),
        path.display()
    );
    Ok(())
}

/// Read a project file.
pub fn load_project(path: &Path) -> Result<ProjectData> {
    let data: ProjectData = import_file(path)?;
    log::info!(
        "Read project with {} element records from {}",
        data.elements.len(),
        path.display()
    );
    Ok(data)
}
