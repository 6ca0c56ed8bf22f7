//! Ruby builds with Bundler.

use super::{empty_as_none, AdapterKind, BuildAdapter, BuildContext, Resolved};
use crate::dispatch::BuildPlan;
use crate::runtimes::{runtimes_with_prefix, Architecture};
use crate::validation::{rules, ArgField, InputErrors};
use crate::workflow::{DependencyManager, Language, Workflow};
use serde::Deserialize;

const WORKFLOW: Workflow = Workflow::new(Language::Ruby, DependencyManager::Bundler);

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RubyArgs {
    pub code: String,
    pub runtime: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub architecture: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RubyAdapter;

impl BuildAdapter for RubyAdapter {
    type Args = RubyArgs;
    const FIELDS: &'static [ArgField] = &[
        ArgField::required("code"),
        ArgField::required("runtime"),
        ArgField::optional("architecture"),
    ];

    fn kind(&self) -> AdapterKind {
        AdapterKind::Ruby
    }

    fn workflows(&self) -> Vec<Workflow> {
        vec![WORKFLOW]
    }

    fn runtimes(&self) -> Vec<&'static str> {
        runtimes_with_prefix("ruby", &[])
    }

    fn validate(&self, args: &RubyArgs, ctx: &BuildContext) -> Result<Architecture, InputErrors> {
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

    fn plan(&self, resolved: &Resolved<'_, RubyArgs>) -> Result<BuildPlan, InputErrors> {
        Ok(BuildPlan::new(
            WORKFLOW,
            resolved.ctx.resolve(&resolved.args.code),
            &resolved.args.runtime,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{errors_of, Harness};
    use crate::builder::{BuilderError, MockBuilder};
    use crate::error::{BuildFailure, ConstructError};
    use serde_json::json;

    #[test]
    fn test_build() {
        let harness = Harness::new("/work");
        harness.fs.add_file("/work/app/Gemfile");

        let built = harness
            .run(&RubyAdapter, json!({"code": "app", "runtime": "ruby3.3"}))
            .unwrap();
        assert_eq!(built.workflow.to_string(), "ruby/bundler");
        assert_eq!(harness.invocation().runtime, "ruby3.3");
    }

    #[test]
    fn test_architecture_error_is_generic() {
        let builder = MockBuilder::failing(BuilderError::UnsupportedArchitecture(
            "arm64 is not supported".to_string(),
        ));
        let harness = Harness::with_builder("/work", builder);
        harness.fs.add_dir("/work/app");

        let err = harness
            .run(
                &RubyAdapter,
                json!({"code": "app", "runtime": "ruby3.2", "architecture": "arm64"}),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ConstructError::Build(BuildFailure::Failed { ref runtime, .. }) if runtime == "Ruby"
        ));
    }

    #[test]
    fn test_code_must_be_directory() {
        let harness = Harness::new("/work");
        harness.fs.add_file("/work/app.rb");

        let errors = errors_of(harness.run(&RubyAdapter, json!({"code": "app.rb", "runtime": "ruby3.3"})));
        assert_eq!(
            errors,
            vec![(
                "code".to_string(),
                "Code path must be a directory, got app.rb".to_string()
            )]
        );
    }
}
