//! Configuration for the lambda-builders binary.
//!
//! Settings are read from environment variables, falling back to defaults.
//!
//! # Environment Variables
//!
//! - `LAMBDA_BUILDERS_BIN`: builder executable - default: "lambda-builders"
//! - `LAMBDA_BUILDERS_SEARCH_PATHS`: extra toolchain directories (`PATH` syntax)
//! - `LAMBDA_BUILDERS_TEMP_DIR`: parent of the per-build temporary directories - default: system temp dir
//! - `LAMBDA_BUILDERS_ARCHIVE`: packaging of build output (directory|zip) - default: "directory"
//! - `LAMBDA_BUILDERS_MAX_PARALLEL`: concurrent builds in `batch` - default: "4"
//! - `LAMBDA_BUILDERS_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use lambda_builders::BuilderConfig;
//!
//! let config = BuilderConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::archive::ArchiveKind;
use crate::builder::lambda_builders::DEFAULT_PROGRAM;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_ARCHIVE: &str = "directory";
const DEFAULT_MAX_PARALLEL: usize = 4;
const MAX_PARALLEL_LIMIT: usize = 64;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid archive kind: {0}. Valid options: directory, zip")]
    InvalidArchive(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Builder executable, resolved through `PATH` when not absolute
    pub builder_bin: PathBuf,

    pub search_paths: Vec<PathBuf>,

    pub temp_dir: PathBuf,

    /// Raw archive setting, checked by [`validate`](Self::validate)
    pub archive: String,

    pub max_parallel: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        let builder_bin = env::var("LAMBDA_BUILDERS_BIN")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM));

        let search_paths = env::var_os("LAMBDA_BUILDERS_SEARCH_PATHS")
            .map(|v| env::split_paths(&v).collect())
            .unwrap_or_default();

        let temp_dir = env::var("LAMBDA_BUILDERS_TEMP_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        let archive = env::var("LAMBDA_BUILDERS_ARCHIVE")
            .unwrap_or_else(|_| DEFAULT_ARCHIVE.to_string())
            .to_lowercase();

        let max_parallel = env::var("LAMBDA_BUILDERS_MAX_PARALLEL")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_PARALLEL);

        let log_level = env::var("LAMBDA_BUILDERS_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            builder_bin,
            search_paths,
            temp_dir,
            archive,
            max_parallel,
            log_level,
        }
    }
}

impl BuilderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.archive_kind()?;

        if self.max_parallel == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max parallel builds must be at least 1".to_string(),
            ));
        }
        if self.max_parallel > MAX_PARALLEL_LIMIT {
            return Err(ConfigError::ValidationFailed(format!(
                "Max parallel builds cannot exceed {}",
                MAX_PARALLEL_LIMIT
            )));
        }

        if self.builder_bin.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Builder executable must not be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn archive_kind(&self) -> Result<ArchiveKind, ConfigError> {
        ArchiveKind::from_name(&self.archive)
            .ok_or_else(|| ConfigError::InvalidArchive(self.archive.clone()))
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert(
            "builder_bin".to_string(),
            self.builder_bin.display().to_string(),
        );
        if !self.search_paths.is_empty() {
            let joined: Vec<String> = self
                .search_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            map.insert("search_paths".to_string(), joined.join(", "));
        }
        map.insert("temp_dir".to_string(), self.temp_dir.display().to_string());
        map.insert("archive".to_string(), self.archive.clone());
        map.insert("max_parallel".to_string(), self.max_parallel.to_string());
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for BuilderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lambda Builders Configuration:")?;
        writeln!(f, "  Builder: {}", self.builder_bin.display())?;
        for path in &self.search_paths {
            writeln!(f, "  Search Path: {}", path.display())?;
        }
        writeln!(f, "  Temp Dir: {}", self.temp_dir.display())?;
        writeln!(f, "  Archive: {}", self.archive)?;
        writeln!(f, "  Max Parallel: {}", self.max_parallel)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
