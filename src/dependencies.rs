//! Dependency folder detection.
//!
//! A build skips the dependency install step when the dependency folder is already
//! present. Only presence is checked; a stale folder is trusted as-is.

use crate::fs::FileSystem;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where an adapter keeps installed dependencies.
#[derive(Debug, Clone)]
pub struct DependencyLayout {
    /// Folder name under the project directory, e.g. `node_modules`.
    pub folder: &'static str,
    /// Absolute caller override, replacing `<project_dir>/<folder>`.
    pub explicit: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyState {
    pub download: bool,
    pub dependencies_dir: PathBuf,
}

pub fn detect(fs: &dyn FileSystem, project_dir: &Path, layout: &DependencyLayout) -> DependencyState {
    let dependencies_dir = layout
        .explicit
        .clone()
        .unwrap_or_else(|| project_dir.join(layout.folder));
    let download = !fs.exists(&dependencies_dir);

    debug!(
        dependencies_dir = %dependencies_dir.display(),
        download,
        "Detected dependency state"
    );

    DependencyState {
        download,
        dependencies_dir,
    }
}
