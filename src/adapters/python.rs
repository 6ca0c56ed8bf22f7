//! Python builds with pip.
//!
//! The requirements file is optional: when none is found above the code directory the
//! build proceeds without dependencies. `code` may also name a single file, in which case
//! its directory is built.

use super::{empty_as_none, AdapterKind, BuildAdapter, BuildContext, Resolved};
use crate::dependencies::DependencyLayout;
use crate::dispatch::BuildPlan;
use crate::manifest::{ManifestPolicy, ManifestStrategy};
use crate::runtimes::{runtimes_with_prefix, Architecture};
use crate::validation::{rules, ArgField, InputErrors};
use crate::workflow::{DependencyManager, Language, Workflow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

const WORKFLOW: Workflow = Workflow::new(Language::Python, DependencyManager::Pip);
const REQUIREMENTS_FILE: &str = "requirements.txt";
const DEPENDENCIES_FOLDER: &str = "package";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PythonArgs {
    pub code: String,
    pub runtime: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub architecture: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub requirements_path: Option<String>,
    /// Directory of already installed dependencies. Defaults to `package` next to the
    /// requirements file.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub dependencies_path: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAdapter;

impl PythonAdapter {
    /// The code path, or its parent when it names a file.
    fn source_dir(args: &PythonArgs, ctx: &BuildContext) -> PathBuf {
        let code = ctx.resolve(&args.code);
        if ctx.fs.is_dir(&code) {
            return code;
        }
        code.parent().map(Path::to_path_buf).unwrap_or(code)
    }
}

impl BuildAdapter for PythonAdapter {
    type Args = PythonArgs;
    const FIELDS: &'static [ArgField] = &[
        ArgField::required("code"),
        ArgField::required("runtime"),
        ArgField::optional("architecture"),
        ArgField::optional("requirements_path"),
        ArgField::optional("dependencies_path"),
    ];

    fn kind(&self) -> AdapterKind {
        AdapterKind::Python
    }

    fn workflows(&self) -> Vec<Workflow> {
        vec![WORKFLOW]
    }

    fn runtimes(&self) -> Vec<&'static str> {
        runtimes_with_prefix("python", &[])
    }

    fn validate(&self, args: &PythonArgs, ctx: &BuildContext) -> Result<Architecture, InputErrors> {
        let mut errors = InputErrors::new();
        errors.check(rules::code_path(
            ctx.fs.as_ref(),
            &ctx.resolve(&args.code),
            &args.code,
            true,
        ));
        errors.check(rules::runtime(&args.runtime, &self.runtimes()));
        let architecture = errors.collect(rules::architecture(args.architecture.as_deref()));
        if let Some(requirements) = &args.requirements_path {
            errors.check(rules::manifest_file(
                ctx.fs.as_ref(),
                "requirements_path",
                REQUIREMENTS_FILE,
                &ctx.resolve(requirements),
                requirements,
            ));
        }
        errors.finish(architecture)
    }

    fn manifest_strategy(&self, args: &PythonArgs, ctx: &BuildContext) -> ManifestStrategy {
        let start = match &args.requirements_path {
            Some(explicit) => ctx.resolve(explicit),
            None => Self::source_dir(args, ctx).join(REQUIREMENTS_FILE),
        };
        let filename = start
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| REQUIREMENTS_FILE.to_string());
        let start_dir = start.parent().map(Path::to_path_buf).unwrap_or_default();

        ManifestStrategy::UpwardSearch {
            filename,
            start_dir,
            property: "requirements_path",
            policy: ManifestPolicy::Optional,
        }
    }

    fn dependency_layout(
        &self,
        resolved: &Resolved<'_, PythonArgs>,
    ) -> Option<(PathBuf, DependencyLayout)> {
        let project_dir = match &resolved.manifest {
            Some(manifest) => manifest.project_dir.clone(),
            None => Self::source_dir(resolved.args, resolved.ctx),
        };
        let layout = DependencyLayout {
            folder: DEPENDENCIES_FOLDER,
            explicit: resolved
                .args
                .dependencies_path
                .as_ref()
                .map(|p| resolved.ctx.resolve(p)),
        };
        Some((project_dir, layout))
    }

    fn plan(&self, resolved: &Resolved<'_, PythonArgs>) -> Result<BuildPlan, InputErrors> {
        let source_dir = Self::source_dir(resolved.args, resolved.ctx);
        if source_dir != resolved.ctx.resolve(&resolved.args.code) {
            warn!(
                "code path is not a directory, using parent directory {} instead",
                source_dir.display()
            );
        }

        Ok(BuildPlan::new(WORKFLOW, source_dir, &resolved.args.runtime)
            .with_manifest(resolved.manifest.as_ref().map(|m| m.manifest_path.clone())))
    }
}
