//! Go builds with Go modules.
//!
//! The workflow builds in the source tree and never reads its manifest, but a manifest
//! path is still required, so `<code>/go.mod` is passed as a placeholder.

use super::{empty_as_none, AdapterKind, BuildAdapter, BuildContext, Resolved};
use crate::dispatch::BuildPlan;
use crate::manifest::ManifestStrategy;
use crate::runtimes::{Architecture, PROVIDED_RUNTIME};
use crate::validation::{rules, ArgField, InputErrors};
use crate::workflow::{DependencyManager, Language, Workflow};
use serde::Deserialize;

const WORKFLOW: Workflow = Workflow::new(Language::Go, DependencyManager::Modules);
const PLACEHOLDER_MANIFEST: &str = "go.mod";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoArgs {
    pub code: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub architecture: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GoAdapter;

impl BuildAdapter for GoAdapter {
    type Args = GoArgs;
    const FIELDS: &'static [ArgField] = &[
        ArgField::required("code"),
        ArgField::optional("architecture"),
    ];

    fn kind(&self) -> AdapterKind {
        AdapterKind::Go
    }

    fn workflows(&self) -> Vec<Workflow> {
        vec![WORKFLOW]
    }

    fn validate(&self, args: &GoArgs, ctx: &BuildContext) -> Result<Architecture, InputErrors> {
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

    fn manifest_strategy(&self, args: &GoArgs, ctx: &BuildContext) -> ManifestStrategy {
        ManifestStrategy::Placeholder(ctx.resolve(&args.code).join(PLACEHOLDER_MANIFEST))
    }

    fn plan(&self, resolved: &Resolved<'_, GoArgs>) -> Result<BuildPlan, InputErrors> {
        let manifest = resolved.manifest.as_ref().map(|m| m.manifest_path.clone());
        Ok(
            BuildPlan::new(WORKFLOW, resolved.ctx.resolve(&resolved.args.code), PROVIDED_RUNTIME)
                .with_manifest(manifest)
                .in_source(),
        )
    }

    fn masks_architecture_errors(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{errors_of, Harness};
    use crate::builder::{BuilderError, MockBuilder};
    use crate::error::{BuildFailure, ConstructError, Stage};
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_placeholder_manifest_and_in_source() {
        let harness = Harness::new("/work");
        harness.fs.add_file("/work/svc/main.go");

        harness.run(&GoAdapter, json!({"code": "svc"})).unwrap();

        let inv = harness.invocation();
        assert_eq!(inv.workflow.to_string(), "go/modules");
        assert_eq!(inv.runtime, "provided");
        assert_eq!(inv.manifest_path, Some(PathBuf::from("/work/svc/go.mod")));
        assert_eq!(inv.build_in_source, Some(true));
        assert_eq!(inv.options, None);
    }

    #[test]
    fn test_unsupported_architecture_is_fixed_message() {
        let builder = MockBuilder::failing(BuilderError::UnsupportedArchitecture(
            "Architecture arm64 is not supported for go1.x".to_string(),
        ));
        let harness = Harness::with_builder("/work", builder);
        harness.fs.add_dir("/work/svc");

        let err = harness
            .run(&GoAdapter, json!({"code": "svc", "architecture": "arm64"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported architecture");
        assert_eq!(err.stage(), Stage::Building);
    }

    #[test]
    fn test_other_failures_name_the_runtime() {
        let builder = MockBuilder::failing(BuilderError::WorkflowFailed(
            "GoModulesBuilder:Build - exit status 1".to_string(),
        ));
        let harness = Harness::with_builder("/work", builder);
        harness.fs.add_dir("/work/svc");

        let err = harness.run(&GoAdapter, json!({"code": "svc"})).unwrap_err();
        assert!(matches!(err, ConstructError::Build(BuildFailure::Failed { .. })));
        assert_eq!(
            err.to_string(),
            "Failed to build Go code: GoModulesBuilder:Build - exit status 1"
        );
    }

    #[test]
    fn test_invalid_architecture_never_reaches_builder() {
        let harness = Harness::new("/work");
        harness.fs.add_dir("/work/svc");

        let errors = errors_of(harness.run(&GoAdapter, json!({"code": "svc", "architecture": "amd64"})));
        assert_eq!(
            errors,
            vec![(
                "architecture".to_string(),
                "Architecture must be one of arm64, x86_64".to_string()
            )]
        );
        assert_eq!(harness.builder.call_count(), 0);
    }
}
