use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

pub const BINARY_EXTENSION: &str = "xclbin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_unix_secs: u64,
}

/// Every packaged binary under `build_root`, sorted by path.
pub fn list_builds(build_root: &Path) -> Result<Vec<BuiltArtifact>> {
    if !build_root.exists() {
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for entry in WalkDir::new(build_root) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().map_or(true, |ext| ext != BINARY_EXTENSION) {
            continue;
        }

        let metadata = entry.metadata().map_err(std::io::Error::from)?;
        let modified_unix_secs = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs());

        artifacts.push(BuiltArtifact {
            path: entry.into_path(),
            size_bytes: metadata.len(),
            modified_unix_secs,
        });
    }

    artifacts.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(artifacts)
}
