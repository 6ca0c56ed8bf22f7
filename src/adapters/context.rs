use crate::archive::{self, Archiver, DirectoryArchiver};
use crate::builder::{Builder, LambdaBuildersCli};
use crate::config::{BuilderConfig, ConfigError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::paths;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Collaborators and ambient locations shared by every adapter invocation.
///
/// The working directory is captured once when the context is created; adapters resolve
/// relative arguments and start the Node.js manifest search from it instead of reading
/// the process state mid-build.
#[derive(Clone)]
pub struct BuildContext {
    pub fs: Arc<dyn FileSystem>,
    pub builder: Arc<dyn Builder>,
    pub archiver: Arc<dyn Archiver>,
    pub working_dir: PathBuf,
    pub temp_root: PathBuf,
}

impl BuildContext {
    pub fn new(builder: Arc<dyn Builder>) -> Self {
        Self {
            fs: Arc::new(RealFileSystem),
            builder,
            archiver: Arc::new(DirectoryArchiver),
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
            temp_root: env::temp_dir(),
        }
    }

    pub fn from_config(config: &BuilderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let builder = LambdaBuildersCli::new(config.builder_bin.clone())
            .with_search_paths(config.search_paths.clone());
        let archiver: Arc<dyn Archiver> = Arc::from(archive::for_kind(config.archive_kind()?));

        Ok(Self::new(Arc::new(builder))
            .with_archiver(archiver)
            .with_temp_root(config.temp_dir.clone()))
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.archiver = archiver;
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = paths::normalize(&working_dir.into());
        self
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    /// Absolute form of an argument path.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        paths::absolutize(&self.working_dir, path.as_ref())
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("archiver", &self.archiver.kind())
            .field("working_dir", &self.working_dir)
            .field("temp_root", &self.temp_root)
            .finish_non_exhaustive()
    }
}
