//! Media-domain value types shared by the pipeline and the API.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Bytes per megabyte (binary, 1024-based).
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// File extensions accepted for upload, lowercase without the dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov"];

/// Convert a byte count to megabytes rounded to two decimal places.
pub fn to_mb(bytes: u64) -> f64 {
    let mb = bytes as f64 / BYTES_PER_MB as f64;
    (mb * 100.0).round() / 100.0
}

/// Whether `name` ends in one of [`ALLOWED_EXTENSIONS`] (case-insensitive).
pub fn has_allowed_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Duration and size of a media file as reported by the prober.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeInfo {
    pub duration_secs: f64,
    pub size_bytes: u64,
}

/// Fields for a new video row, produced by upload, trim, and merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFields {
    pub file_path: PathBuf,
    pub size_mb: f64,
    pub duration_secs: f64,
}

impl AssetFields {
    /// Build the fields for `path` from its probe result.
    pub fn from_probe(path: impl Into<PathBuf>, info: ProbeInfo) -> Self {
        Self {
            file_path: path.into(),
            size_mb: to_mb(info.size_bytes),
            duration_secs: info.duration_secs,
        }
    }
}
