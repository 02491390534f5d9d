//! # Install Marker
//!
//! File: cli/src/commands/install/marker.rs
//!
//! ## Overview
//!
//! `.dashgraft.json` at the project root records that an install completed.
//! Its presence makes `dashgraft install` refuse to run again: the second
//! run would otherwise stack a second set of routes and imports on top of
//! the first. Deleting the file is the documented way to force a reinstall.
//!
use crate::common::fs::io::{read_file_to_string, write_string_to_file};
use crate::core::error::{DashgraftError, Result};
use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const MARKER_FILENAME: &str = ".dashgraft.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstallMarker {
    pub version: String,
    pub installed_at: DateTime<Utc>,
}

pub fn marker_path(root: &Path) -> PathBuf {
    root.join(MARKER_FILENAME)
}

/// Fails with `AlreadyInstalled` when the marker exists.
pub fn ensure_not_installed(root: &Path) -> Result<()> {
    let path = marker_path(root);
    if path.exists() {
        bail!(DashgraftError::AlreadyInstalled {
            marker: path.display().to_string(),
        });
    }
    Ok(())
}

/// Reads the marker, if present.
pub fn read_marker(root: &Path) -> Result<Option<InstallMarker>> {
    let path = marker_path(root);
    if !path.is_file() {
        return Ok(None);
    }
    let text = read_file_to_string(&path)?;
    let marker = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse install marker {}", path.display()))?;
    Ok(Some(marker))
}

/// Writes the marker with the current version and time.
pub fn write_marker(root: &Path) -> Result<PathBuf> {
    let marker = InstallMarker {
        version: env!("CARGO_PKG_VERSION").to_string(),
        installed_at: Utc::now(),
    };
    let path = marker_path(root);
    let json = serde_json::to_string_pretty(&marker).context("Failed to serialize install marker")?;
    write_string_to_file(&path, &format!("{json}\n"))?;
    info!("Wrote install marker {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_marker_round_trip_and_guard() -> Result<()> {
        let dir = tempdir()?;
        ensure_not_installed(dir.path())?;
        assert!(read_marker(dir.path())?.is_none());

        let path = write_marker(dir.path())?;
        let raw = std::fs::read_to_string(&path)?;
        assert!(raw.contains("\"installedAt\""));
        assert!(raw.contains(env!("CARGO_PKG_VERSION")));

        let marker = read_marker(dir.path())?.expect("marker should exist");
        assert_eq!(marker.version, env!("CARGO_PKG_VERSION"));

        let err = ensure_not_installed(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DashgraftError>(),
            Some(DashgraftError::AlreadyInstalled { .. })
        ));
        Ok(())
    }
}
