//! Java builds with Gradle or Maven, chosen by the build file present in the code
//! directory.

use super::{empty_as_none, AdapterKind, BuildAdapter, BuildContext, Resolved};
use crate::dispatch::BuildPlan;
use crate::manifest::{ManifestCandidate, ManifestStrategy};
use crate::runtimes::{runtimes_with_prefix, Architecture};
use crate::validation::{rules, ArgField, InputErrors, PropertyError};
use crate::workflow::{DependencyManager, Language, Workflow};
use serde::Deserialize;

/// Build files in priority order.
const BUILD_FILES: &[ManifestCandidate] = &[
    ManifestCandidate {
        filename: "build.gradle",
        dependency_manager: DependencyManager::Gradle,
    },
    ManifestCandidate {
        filename: "build.gradle.kts",
        dependency_manager: DependencyManager::Gradle,
    },
    ManifestCandidate {
        filename: "pom.xml",
        dependency_manager: DependencyManager::Maven,
    },
];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JavaArgs {
    pub code: String,
    pub runtime: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub architecture: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JavaAdapter;

impl BuildAdapter for JavaAdapter {
    type Args = JavaArgs;
    const FIELDS: &'static [ArgField] = &[
        ArgField::required("code"),
        ArgField::required("runtime"),
        ArgField::optional("architecture"),
    ];

    fn kind(&self) -> AdapterKind {
        AdapterKind::Java
    }

    fn workflows(&self) -> Vec<Workflow> {
        vec![
            Workflow::new(Language::Java, DependencyManager::Gradle),
            Workflow::new(Language::Java, DependencyManager::Maven),
        ]
    }

    fn runtimes(&self) -> Vec<&'static str> {
        runtimes_with_prefix("java", &[])
    }

    fn validate(&self, args: &JavaArgs, ctx: &BuildContext) -> Result<Architecture, InputErrors> {
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

    fn manifest_strategy(&self, args: &JavaArgs, ctx: &BuildContext) -> ManifestStrategy {
        ManifestStrategy::FixedCandidates {
            dir: ctx.resolve(&args.code),
            candidates: BUILD_FILES,
            property: "code",
        }
    }

    fn plan(&self, resolved: &Resolved<'_, JavaArgs>) -> Result<BuildPlan, InputErrors> {
        let manifest = resolved.manifest.as_ref();
        let manager = manifest
            .and_then(|m| m.dependency_manager)
            .ok_or_else(|| PropertyError::new("code", "Could not determine the Java build tool"))?;

        Ok(BuildPlan::new(
            Workflow::new(Language::Java, manager),
            resolved.ctx.resolve(&resolved.args.code),
            &resolved.args.runtime,
        )
        .with_manifest(manifest.map(|m| m.manifest_path.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{errors_of, Harness};
    use crate::error::{ConstructError, Stage};
    use serde_json::json;
    use std::path::PathBuf;
    use yare::parameterized;

    #[parameterized(
        groovy_over_maven = { &["build.gradle", "pom.xml"], "build.gradle", "java/gradle" },
        kotlin_over_maven = { &["build.gradle.kts", "pom.xml"], "build.gradle.kts", "java/gradle" },
        groovy_over_kotlin = { &["build.gradle.kts", "build.gradle"], "build.gradle", "java/gradle" },
        maven_only = { &["pom.xml"], "pom.xml", "java/maven" },
    )]
    fn test_build_file_priority(files: &[&str], expected: &str, workflow: &str) {
        let harness = Harness::new("/work");
        for file in files {
            harness.fs.add_file(format!("/work/fn/{}", file));
        }

        harness
            .run(&JavaAdapter, json!({"code": "fn", "runtime": "java21"}))
            .unwrap();

        let inv = harness.invocation();
        assert_eq!(inv.manifest_path, Some(PathBuf::from("/work/fn").join(expected)));
        assert_eq!(inv.workflow.to_string(), workflow);
    }

    #[test]
    fn test_no_build_file() {
        let harness = Harness::new("/work");
        harness.fs.add_file("/work/fn/Main.java");

        let result = harness.run(&JavaAdapter, json!({"code": "fn", "runtime": "java17"}));
        if let Err(ConstructError::Invalid { stage, .. }) = &result {
            assert_eq!(*stage, Stage::ResolvingManifest);
        }
        assert_eq!(
            errors_of(result),
            vec![(
                "code".to_string(),
                "No build.gradle, build.gradle.kts, or pom.xml found in code directory".to_string()
            )]
        );
    }

    #[test]
    fn test_build_file_in_parent_is_ignored() {
        let harness = Harness::new("/work");
        harness.fs.add_file("/work/pom.xml");
        harness.fs.add_dir("/work/fn");

        let errors = errors_of(harness.run(&JavaAdapter, json!({"code": "fn", "runtime": "java17"})));
        assert_eq!(errors[0].0, "code");
    }
}
