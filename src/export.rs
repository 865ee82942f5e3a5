use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::models::CaptureRecord;

/// Writes the full capture snapshot into `dir` as a pretty-printed JSON
/// array, named `prompt_bin_export_<YYYY-MM-DD>.json`. Returns the path.
pub fn write_snapshot(records: &[CaptureRecord], dir: &Path) -> Result<PathBuf> {
    let filename = format!("prompt_bin_export_{}.json", Utc::now().format("%Y-%m-%d"));
    let path = dir.join(filename);

    let serialized =
        serde_json::to_string_pretty(records).context("failed to serialize capture snapshot")?;
    fs::write(&path, serialized)
        .with_context(|| format!("failed to write snapshot to {}", path.display()))?;

    Ok(path)
}
