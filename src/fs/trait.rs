//! FileSystem trait definition

use std::path::Path;

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    /// Anything else: devices, sockets, pipes
    Other,
}

/// Read-only view of the file system used before any build directory is created.
///
/// Every lookup the adapters make (entry files, manifests, dependency folders) goes
/// through this trait; nothing here mutates the tree.
pub trait FileSystem: Send + Sync {
    /// Type of the entry at `path`, following symlinks. `None` when absent.
    fn file_type(&self, path: &Path) -> Option<FileType>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool {
        self.file_type(path).is_some()
    }

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool {
        self.file_type(path) == Some(FileType::Directory)
    }

    /// Check if path is a regular file
    fn is_file(&self, path: &Path) -> bool {
        self.file_type(path) == Some(FileType::File)
    }
}
