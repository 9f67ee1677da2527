//! File helpers for short-lived working files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Builds a collision-free file path inside `dir`: `<prefix>-<label>-<uuid>.<extension>`.
pub fn unique_file_path(dir: &Path, prefix: &str, label: &str, extension: &str) -> PathBuf {
    let id = uuid::Uuid::new_v4().simple();
    dir.join(format!("{prefix}-{label}-{id}.{extension}"))
}

/// Removes a file, treating "already gone" as success.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Removes every path independently. Failures are logged and do not stop the rest.
/// Returns the number of paths that could not be removed.
pub fn remove_all_best_effort<'a, I>(paths: I) -> usize
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut failures = 0;
    for path in paths {
        match remove_if_exists(path) {
            Ok(true) => debug!(path = %path.display(), "removed"),
            Ok(false) => {}
            Err(err) => {
                failures += 1;
                warn!(path = %path.display(), error = %err, "failed to remove file");
            }
        }
    }
    failures
}

/// Returns paths to all files in a directory matching the given extensions.
/// Extensions are matched case-insensitively.
pub fn files_with_extensions(dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let files = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| {
            if !path.is_file() {
                return false;
            }
            let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
            extensions.contains(&ext.to_lowercase().as_str())
        })
        .collect();

    Ok(files)
}
