use std::path::{Path, PathBuf};

use common::file_utils::{remove_all_best_effort, unique_file_path};
use tracing::debug;

use super::state::ImageRole;
use crate::session::SessionId;

/// Temporary files owned by one session.
///
/// Paths are tracked before anything is written to them. [`Artifacts::cleanup`]
/// removes them once; dropping the value cleans whatever is still tracked.
#[derive(Debug)]
pub struct Artifacts {
    dir: PathBuf,
    prefix: String,
    paths: Vec<PathBuf>,
}

impl Artifacts {
    pub fn new(dir: impl Into<PathBuf>, session_id: SessionId) -> Self {
        Self {
            dir: dir.into(),
            prefix: session_id.short(),
            paths: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserves and tracks a new path for an input image.
    pub fn image_path(&mut self, role: ImageRole) -> PathBuf {
        self.track(&role.to_string())
    }

    /// Reserves and tracks the path of the composite.
    pub fn result_path(&mut self) -> PathBuf {
        self.track("result")
    }

    fn track(&mut self, label: &str) -> PathBuf {
        let path = unique_file_path(&self.dir, &self.prefix, label, "png");
        self.paths.push(path.clone());
        path
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Removes every tracked file. Later calls do nothing.
    /// Returns the number of files that could not be removed.
    pub fn cleanup(&mut self) -> usize {
        if self.paths.is_empty() {
            return 0;
        }

        let paths = std::mem::take(&mut self.paths);
        let failures = remove_all_best_effort(paths.iter().map(PathBuf::as_path));
        debug!(
            count = paths.len(),
            failures,
            prefix = %self.prefix,
            "session artifacts cleaned"
        );
        failures
    }
}

impl Drop for Artifacts {
    fn drop(&mut self) {
        self.cleanup();
    }
}
