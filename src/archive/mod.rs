//! Packaging of a populated artifacts directory.

pub mod zipped;

pub use zipped::ZipArchiver;

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

crate::define_id_enum! {
    /// How an artifacts directory is handed to the host
    ArchiveKind {
        Directory => "directory" : "Directory" | "dir",
        Zip => "zip" : "Zip archive",
    }
}

/// The packaged asset returned from `construct`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveHandle {
    pub kind: ArchiveKind,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

pub trait Archiver: Send + Sync {
    fn kind(&self) -> ArchiveKind;

    fn archive(&self, directory: &Path) -> Result<ArchiveHandle>;
}

/// Hands the artifacts directory over as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryArchiver;

impl Archiver for DirectoryArchiver {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Directory
    }

    fn archive(&self, directory: &Path) -> Result<ArchiveHandle> {
        if !directory.is_dir() {
            bail!("Artifacts directory {} does not exist", directory.display());
        }
        debug!(path = %directory.display(), "Archived as directory");
        Ok(ArchiveHandle {
            kind: ArchiveKind::Directory,
            path: directory.to_path_buf(),
            size: None,
            sha256: None,
        })
    }
}

/// Archiver for a configured kind.
pub fn for_kind(kind: ArchiveKind) -> Box<dyn Archiver> {
    match kind {
        ArchiveKind::Directory => Box::new(DirectoryArchiver),
        ArchiveKind::Zip => Box::new(ZipArchiver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_archiver() {
        let dir = TempDir::new().unwrap();
        let handle = DirectoryArchiver.archive(dir.path()).unwrap();
        assert_eq!(handle.kind, ArchiveKind::Directory);
        assert_eq!(handle.path, dir.path());
        assert!(handle.sha256.is_none());
    }

    #[test]
    fn test_directory_archiver_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(DirectoryArchiver.archive(&dir.path().join("gone")).is_err());
    }

    #[test]
    fn test_for_kind() {
        assert_eq!(for_kind(ArchiveKind::Zip).kind(), ArchiveKind::Zip);
        assert_eq!(ArchiveKind::from_name("dir"), Some(ArchiveKind::Directory));
    }
}
