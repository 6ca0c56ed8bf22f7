//! Per-runtime build adapters.
//!
//! Every adapter runs the same pipeline: validate the arguments, resolve the manifest,
//! detect installed dependencies, dispatch to the [`Builder`](crate::builder::Builder)
//! and archive the artifacts directory. An adapter only supplies the per-runtime pieces
//! through [`BuildAdapter`]; [`construct`] drives the rest.

mod context;
pub mod custom;
pub mod dotnet;
pub mod go;
pub mod java;
pub mod nodejs;
pub mod python;
pub mod registry;
pub mod ruby;
pub mod rust;

pub use context::BuildContext;
pub use registry::{construct_value, describe, AdapterInfo};

use crate::archive::ArchiveHandle;
use crate::dependencies::{self, DependencyLayout};
use crate::dispatch::{self, BuildPlan, Workspace};
use crate::error::{ConstructError, Stage};
use crate::manifest::{self, ManifestLocation, ManifestStrategy};
use crate::runtimes::Architecture;
use crate::validation::{ArgField, InputErrors};
use crate::workflow::Workflow;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;
use std::path::PathBuf;
use tracing::{debug, info, info_span};

crate::define_id_enum! {
    /// Runtime family served by an adapter
    AdapterKind {
        Custom => "custom" : "Custom" | "make" | "custom-make",
        Dotnet => "dotnet" : ".NET",
        Go => "go" : "Go" | "golang",
        Java => "java" : "Java",
        Nodejs => "nodejs" : "Node.js" | "node",
        Python => "python" : "Python",
        Ruby => "ruby" : "Ruby",
        Rust => "rust" : "Rust",
    }
}

impl AdapterKind {
    /// Resource type token the host registers the adapter under.
    pub fn type_token(&self) -> &'static str {
        match self {
            AdapterKind::Custom => "lambda-builders:index:BuildCustomMake",
            AdapterKind::Dotnet => "lambda-builders:index:BuildDotnet",
            AdapterKind::Go => "lambda-builders:index:BuildGo",
            AdapterKind::Java => "lambda-builders:index:BuildJava",
            AdapterKind::Nodejs => "lambda-builders:index:BuildNodejs",
            AdapterKind::Python => "lambda-builders:index:BuildPython",
            AdapterKind::Ruby => "lambda-builders:index:BuildRuby",
            AdapterKind::Rust => "lambda-builders:index:BuildRust",
        }
    }
}

/// Validated inputs handed to the later stages.
pub struct Resolved<'a, A> {
    pub args: &'a A,
    pub ctx: &'a BuildContext,
    pub architecture: Architecture,
    pub manifest: Option<ManifestLocation>,
}

/// Per-runtime descriptor driven by [`construct`].
pub trait BuildAdapter {
    type Args: DeserializeOwned + Debug;

    /// Every key `Args` accepts, checked before decoding so all missing and unknown
    /// keys are reported together.
    const FIELDS: &'static [ArgField];

    fn kind(&self) -> AdapterKind;

    /// Workflows this adapter may dispatch to.
    fn workflows(&self) -> Vec<Workflow>;

    /// Runtime identifiers accepted in the `runtime` argument; empty when the adapter
    /// takes none.
    fn runtimes(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Collects every argument problem. Returns the resolved architecture.
    fn validate(&self, args: &Self::Args, ctx: &BuildContext)
        -> Result<Architecture, InputErrors>;

    fn manifest_strategy(&self, _args: &Self::Args, _ctx: &BuildContext) -> ManifestStrategy {
        ManifestStrategy::NotApplicable
    }

    /// Project directory and dependency layout, for adapters that vendor dependencies.
    fn dependency_layout(
        &self,
        _resolved: &Resolved<'_, Self::Args>,
    ) -> Option<(PathBuf, DependencyLayout)> {
        None
    }

    fn plan(&self, resolved: &Resolved<'_, Self::Args>) -> Result<BuildPlan, InputErrors>;

    /// Whether an unsupported-architecture builder error is reported with the fixed
    /// message instead of a generic build failure.
    fn masks_architecture_errors(&self) -> bool {
        false
    }
}

/// Result of a successful `construct`.
#[derive(Debug, Clone, Serialize)]
pub struct Constructed {
    pub name: String,
    pub adapter: AdapterKind,
    pub workflow: Workflow,
    pub runtime: String,
    pub architecture: Architecture,
    pub asset: ArchiveHandle,
}

pub fn construct<A: BuildAdapter>(
    adapter: &A,
    name: &str,
    args: &A::Args,
    ctx: &BuildContext,
) -> Result<Constructed, ConstructError> {
    let kind = adapter.kind();
    let span = info_span!("construct", adapter = %kind, name = %name);
    let _enter = span.enter();

    let enter = |stage: Stage| debug!(stage = %stage, "Entering stage");
    enter(Stage::Created);
    debug!(args = ?args, "Constructing");

    enter(Stage::Validating);
    let architecture = adapter
        .validate(args, ctx)
        .map_err(|e| ConstructError::invalid(Stage::Validating, e))?;

    enter(Stage::ResolvingManifest);
    let strategy = adapter.manifest_strategy(args, ctx);
    let manifest = manifest::resolve(ctx.fs.as_ref(), &strategy)
        .map_err(|e| ConstructError::invalid(Stage::ResolvingManifest, e))?;

    let resolved = Resolved {
        args,
        ctx,
        architecture,
        manifest,
    };

    let dependencies = adapter.dependency_layout(&resolved).map(|(project_dir, layout)| {
        enter(Stage::DetectingDependencies);
        dependencies::detect(ctx.fs.as_ref(), &project_dir, &layout)
    });

    let plan = adapter
        .plan(&resolved)
        .map_err(|e| ConstructError::invalid(Stage::ResolvingManifest, e))?;

    enter(Stage::Building);
    let workspace = Workspace::create(&ctx.temp_root).map_err(ConstructError::Workspace)?;
    let invocation = dispatch::invocation(&plan, architecture, dependencies.as_ref(), &workspace);
    dispatch::dispatch(
        ctx.builder.as_ref(),
        &invocation,
        kind.name(),
        adapter.masks_architecture_errors(),
    )?;

    enter(Stage::Packaging);
    let asset = ctx
        .archiver
        .archive(&workspace.artifacts_dir)
        .map_err(ConstructError::Archive)?;

    enter(Stage::Done);
    info!(workflow = %plan.workflow, asset = %asset.path.display(), "Build complete");

    Ok(Constructed {
        name: name.to_string(),
        adapter: kind,
        workflow: plan.workflow,
        runtime: plan.runtime,
        architecture,
        asset,
    })
}

/// Treats `""` as an absent optional string.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
