//! Build dispatch: temporary workspace, builder invocation and failure classification.

use crate::builder::{BuildInvocation, Builder, BuilderError};
use crate::dependencies::DependencyState;
use crate::error::BuildFailure;
use crate::runtimes::Architecture;
use crate::workflow::Workflow;
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const ARTIFACTS_PREFIX: &str = "lambda-artifacts-";
pub const SCRATCH_PREFIX: &str = "lambda-scratch-";

/// Adapter-specific half of a builder invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildPlan {
    pub workflow: Workflow,
    pub source_dir: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub runtime: String,
    pub options: Option<Map<String, Value>>,
    pub build_in_source: Option<bool>,
    pub experimental_flags: Vec<String>,
}

impl BuildPlan {
    pub fn new(workflow: Workflow, source_dir: PathBuf, runtime: impl Into<String>) -> Self {
        Self {
            workflow,
            source_dir,
            manifest_path: None,
            runtime: runtime.into(),
            options: None,
            build_in_source: None,
            experimental_flags: Vec::new(),
        }
    }

    pub fn with_manifest(mut self, manifest_path: Option<PathBuf>) -> Self {
        self.manifest_path = manifest_path;
        self
    }

    pub fn with_options(mut self, options: Map<String, Value>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn in_source(mut self) -> Self {
        self.build_in_source = Some(true);
        self
    }

    pub fn with_experimental_flag(mut self, flag: impl Into<String>) -> Self {
        self.experimental_flags.push(flag.into());
        self
    }
}

/// Fresh per-invocation directories. They are never reused or removed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub artifacts_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

impl Workspace {
    pub fn create(temp_root: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(temp_root)?;
        let artifacts_dir = tempfile::Builder::new()
            .prefix(ARTIFACTS_PREFIX)
            .tempdir_in(temp_root)?
            .keep();
        let scratch_dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(temp_root)?
            .keep();

        debug!(
            artifacts_dir = %artifacts_dir.display(),
            scratch_dir = %scratch_dir.display(),
            "Created build workspace"
        );

        Ok(Self {
            artifacts_dir,
            scratch_dir,
        })
    }
}

pub fn invocation(
    plan: &BuildPlan,
    architecture: Architecture,
    dependencies: Option<&DependencyState>,
    workspace: &Workspace,
) -> BuildInvocation {
    BuildInvocation {
        workflow: plan.workflow,
        source_dir: plan.source_dir.clone(),
        artifacts_dir: workspace.artifacts_dir.clone(),
        scratch_dir: workspace.scratch_dir.clone(),
        manifest_path: plan.manifest_path.clone(),
        runtime: plan.runtime.clone(),
        architecture,
        options: plan.options.clone(),
        download_dependencies: dependencies.map(|d| d.download),
        dependencies_dir: dependencies.map(|d| d.dependencies_dir.clone()),
        build_in_source: plan.build_in_source,
        experimental_flags: plan.experimental_flags.clone(),
    }
}

/// Maps a builder error to the failure reported to the caller.
///
/// With `mask_architecture` an unsupported-architecture error becomes the fixed
/// [`BuildFailure::UnsupportedArchitecture`]; otherwise it is a generic failure like any
/// other.
pub fn classify(error: BuilderError, display_name: &str, mask_architecture: bool) -> BuildFailure {
    match error {
        BuilderError::UnsupportedArchitecture(_) if mask_architecture => {
            BuildFailure::UnsupportedArchitecture
        }
        other => BuildFailure::Failed {
            runtime: display_name.to_string(),
            message: other.to_string(),
        },
    }
}

/// Runs the builder once. No retries.
pub fn dispatch(
    builder: &dyn Builder,
    invocation: &BuildInvocation,
    display_name: &str,
    mask_architecture: bool,
) -> Result<(), BuildFailure> {
    info!(
        workflow = %invocation.workflow,
        artifacts_dir = %invocation.artifacts_dir.display(),
        "Building {} code",
        display_name
    );

    builder.build(invocation).map_err(|e| {
        error!(workflow = %invocation.workflow, "Build failed: {}", e);
        classify(e, display_name, mask_architecture)
    })
}
