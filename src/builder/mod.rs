//! The external builder capability.
//!
//! Compilers, bundlers and package managers are never run by this crate directly; an
//! adapter hands a [`BuildInvocation`] to a [`Builder`] and only interprets the outcome.

pub mod lambda_builders;
pub mod mock;

pub use lambda_builders::LambdaBuildersCli;
pub use mock::MockBuilder;

use crate::runtimes::Architecture;
use crate::workflow::Workflow;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;

/// Everything the builder needs for one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildInvocation {
    pub workflow: Workflow,
    pub source_dir: PathBuf,
    pub artifacts_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub runtime: String,
    pub architecture: Architecture,
    pub options: Option<Map<String, Value>>,
    pub download_dependencies: Option<bool>,
    pub dependencies_dir: Option<PathBuf>,
    pub build_in_source: Option<bool>,
    pub experimental_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// The workflow cannot target the requested architecture.
    #[error("{0}")]
    UnsupportedArchitecture(String),

    /// The workflow ran and failed (resolution, compilation, bundling, ...).
    #[error("{0}")]
    WorkflowFailed(String),

    #[error("Failed to launch {program}: {message}")]
    Unavailable { program: String, message: String },

    #[error("Unexpected response from builder: {0}")]
    Protocol(String),
}

pub trait Builder: Send + Sync {
    /// Runs one build to completion, populating `invocation.artifacts_dir`.
    fn build(&self, invocation: &BuildInvocation) -> Result<(), BuilderError>;
}
