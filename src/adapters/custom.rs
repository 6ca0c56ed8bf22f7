//! Makefile-driven builds (`provided` runtime).
//!
//! The code directory must contain a Makefile with a `build-<make_target_id>` target.

use super::{empty_as_none, AdapterKind, BuildAdapter, BuildContext, Resolved};
use crate::dispatch::BuildPlan;
use crate::runtimes::{Architecture, PROVIDED_RUNTIME};
use crate::validation::{rules, ArgField, InputErrors};
use crate::workflow::{Language, Workflow};
use serde::Deserialize;
use serde_json::{json, Map};

const WORKFLOW: Workflow = Workflow::language_only(Language::Provided);

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomMakeArgs {
    pub code: String,
    pub make_target_id: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub architecture: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CustomMakeAdapter;

impl BuildAdapter for CustomMakeAdapter {
    type Args = CustomMakeArgs;
    const FIELDS: &'static [ArgField] = &[
        ArgField::required("code"),
        ArgField::required("make_target_id"),
        ArgField::optional("architecture"),
    ];

    fn kind(&self) -> AdapterKind {
        AdapterKind::Custom
    }

    fn workflows(&self) -> Vec<Workflow> {
        vec![WORKFLOW]
    }

    fn validate(&self, args: &CustomMakeArgs, ctx: &BuildContext) -> Result<Architecture, InputErrors> {
        let mut errors = InputErrors::new();
        errors.check(rules::code_path(
            ctx.fs.as_ref(),
            &ctx.resolve(&args.code),
            &args.code,
            false,
        ));
        errors.check(rules::non_empty(
            "make_target_id",
            "Make target id",
            &args.make_target_id,
        ));
        let architecture = errors.collect(rules::architecture(args.architecture.as_deref()));
        errors.finish(architecture)
    }

    fn plan(&self, resolved: &Resolved<'_, CustomMakeArgs>) -> Result<BuildPlan, InputErrors> {
        let mut options = Map::new();
        options.insert(
            "build_logical_id".to_string(),
            json!(resolved.args.make_target_id),
        );

        Ok(
            BuildPlan::new(WORKFLOW, resolved.ctx.resolve(&resolved.args.code), PROVIDED_RUNTIME)
                .with_options(options)
                .in_source(),
        )
    }
}
