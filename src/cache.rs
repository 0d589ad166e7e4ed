// Cache-first JSON artifacts on disk.
//
// Analysis and embedding files are written once and then trusted: if a file
// exists at the target path it is returned as-is, and the only way to force
// recomputation is to delete it. Writes go to a temporary sibling that is
// renamed into place, so a failed run never leaves a half-written artifact
// that a later run would mistake for a cached result.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

/// Directory, next to the analysis file, that holds embedding files.
pub const EMBEDDING_DIR: &str = "embedding";

/// Conventional embedding path for an analysis file:
/// `out/plugin.json` → `out/embedding/plugin.json`.
pub fn embedding_path_for(analysis_path: &Path) -> PathBuf {
    let parent = analysis_path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = analysis_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    parent.join(EMBEDDING_DIR).join(file_name)
}

/// Read a cached artifact. `Ok(None)` when nothing is cached yet.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cached artifact {}", path.display()))?;
    let value = serde_json::from_str(&json)
        .with_context(|| format!("Cached artifact {} is not valid JSON", path.display()))?;
    debug!(path = %path.display(), "Loaded cached artifact");
    Ok(Some(value))
}

/// Write an artifact as pretty JSON, creating parent directories.
pub fn store<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(value).context("Failed to serialize artifact")?;
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;
    info!(path = %path.display(), "Wrote artifact");
    Ok(())
}

/// Return the cached artifact at `path`, or build, store, and return it.
/// `build` is not called at all when a cached artifact exists.
pub fn load_or_build<T, E, F>(path: &Path, build: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    E: std::error::Error + Send + Sync + 'static,
    F: FnOnce() -> std::result::Result<T, E>,
{
    if let Some(cached) = load(path)? {
        info!(path = %path.display(), "Using cached artifact");
        return Ok(cached);
    }
    let value = build()?;
    store(path, &value)?;
    Ok(value)
}

/// Delete a cached artifact if present. Returns whether anything was removed.
pub fn invalidate(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    info!(path = %path.display(), "Removed cached artifact");
    Ok(true)
}
