//! .NET builds through the `dotnet` CLI packaging workflow.

use super::{empty_as_none, AdapterKind, BuildAdapter, BuildContext, Resolved};
use crate::dispatch::BuildPlan;
use crate::runtimes::{runtimes_with_prefix, Architecture};
use crate::validation::{rules, ArgField, InputErrors};
use crate::workflow::{DependencyManager, Language, Workflow};
use serde::Deserialize;
use serde_json::{Map, Value};

const WORKFLOW: Workflow = Workflow::new(Language::Dotnet, DependencyManager::CliPackage);

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DotnetArgs {
    pub code: String,
    pub runtime: String,
    /// CLI flags for `dotnet lambda package`, keyed with their dashes (`--configuration`).
    #[serde(default)]
    pub build_options: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub architecture: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DotnetAdapter;

impl BuildAdapter for DotnetAdapter {
    type Args = DotnetArgs;
    const FIELDS: &'static [ArgField] = &[
        ArgField::required("code"),
        ArgField::required("runtime"),
        ArgField::optional("build_options"),
        ArgField::optional("architecture"),
    ];

    fn kind(&self) -> AdapterKind {
        AdapterKind::Dotnet
    }

    fn workflows(&self) -> Vec<Workflow> {
        vec![WORKFLOW]
    }

    fn runtimes(&self) -> Vec<&'static str> {
        runtimes_with_prefix("dotnet", &[])
    }

    fn validate(&self, args: &DotnetArgs, ctx: &BuildContext) -> Result<Architecture, InputErrors> {
        let mut errors = InputErrors::new();
        errors.check(rules::code_path(
            ctx.fs.as_ref(),
            &ctx.resolve(&args.code),
            &args.code,
            false,
        ));
        errors.check(rules::runtime(&args.runtime, &self.runtimes()));
        let architecture = errors.collect(rules::architecture(args.architecture.as_deref()));
        errors.finish(architecture)
    }

    fn plan(&self, resolved: &Resolved<'_, DotnetArgs>) -> Result<BuildPlan, InputErrors> {
        let args = resolved.args;
        let mut plan = BuildPlan::new(WORKFLOW, resolved.ctx.resolve(&args.code), &args.runtime);
        if let Some(options) = &args.build_options {
            plan = plan.with_options(options.clone());
        }
        Ok(plan)
    }
}
