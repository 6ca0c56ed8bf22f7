//! Upward manifest search.

use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Looks for `filename` in `start_dir`, then in each ancestor up to the file system root.
///
/// Returns the first hit, so the nearest manifest wins. The walk ends when a directory
/// has no parent (`/` on POSIX, the drive root on Windows).
pub fn find_up(fs: &dyn FileSystem, filename: &str, start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let candidate = dir.join(filename);
        trace!(candidate = %candidate.display(), "Probing for manifest");
        if fs.exists(&candidate) {
            return Some(candidate);
        }

        match dir.parent() {
            Some(parent) if parent != dir => dir = parent,
            _ => return None,
        }
    }
}
