//! Rust builds through Cargo Lambda.

use super::{empty_as_none, AdapterKind, BuildAdapter, BuildContext, Resolved};
use crate::dispatch::BuildPlan;
use crate::runtimes::{Architecture, PROVIDED_RUNTIME};
use crate::validation::{rules, ArgField, InputErrors};
use crate::workflow::{DependencyManager, Language, Workflow};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const WORKFLOW: Workflow = Workflow::new(Language::Rust, DependencyManager::Cargo);
pub const CARGO_LAMBDA_FLAG: &str = "experimentalCargoLambda";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RustArgs {
    pub code: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub architecture: Option<String>,
    /// Binary to package; needed for cargo workspaces with several binaries.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub binary_name: Option<String>,
    /// Extra cargo flags keyed with their dashes (`--features`).
    #[serde(default)]
    pub cargo_flags: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RustAdapter;

impl BuildAdapter for RustAdapter {
    type Args = RustArgs;
    const FIELDS: &'static [ArgField] = &[
        ArgField::required("code"),
        ArgField::optional("architecture"),
        ArgField::optional("binary_name"),
        ArgField::optional("cargo_flags"),
    ];

    fn kind(&self) -> AdapterKind {
        AdapterKind::Rust
    }

    fn workflows(&self) -> Vec<Workflow> {
        vec![WORKFLOW]
    }

    fn validate(&self, args: &RustArgs, ctx: &BuildContext) -> Result<Architecture, InputErrors> {
        let mut errors = InputErrors::new();
        errors.check(rules::code_path(
            ctx.fs.as_ref(),
            &ctx.resolve(&args.code),
            &args.code,
            false,
        ));
        let architecture = errors.collect(rules::architecture(args.architecture.as_deref()));
        errors.finish(architecture)
    }

    fn plan(&self, resolved: &Resolved<'_, RustArgs>) -> Result<BuildPlan, InputErrors> {
        let args = resolved.args;
        let mut options = Map::new();
        if let Some(binary) = &args.binary_name {
            options.insert("artifact_executable_name".to_string(), json!(binary));
        }
        if let Some(flags) = args.cargo_flags.as_ref().filter(|f| !f.is_empty()) {
            options.insert("cargo_lambda_flags".to_string(), Value::Object(flags.clone()));
        }

        Ok(
            BuildPlan::new(WORKFLOW, resolved.ctx.resolve(&args.code), PROVIDED_RUNTIME)
                .with_options(options)
                .in_source()
                .with_experimental_flag(CARGO_LAMBDA_FLAG),
        )
    }
}
