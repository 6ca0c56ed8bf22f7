//! Node.js builds, bundled with esbuild by default.
//!
//! `package.json` is searched upwards from the context working directory (not from the
//! entry file), and the entry point is passed to the bundler relative to the directory
//! the manifest was found in.

use super::{empty_as_none, AdapterKind, BuildAdapter, BuildContext, Resolved};
use crate::dependencies::DependencyLayout;
use crate::dispatch::BuildPlan;
use crate::manifest::{ManifestPolicy, ManifestStrategy};
use crate::paths;
use crate::runtimes::{runtimes_with_prefix, Architecture, DEPRECATED_NODEJS_RUNTIME};
use crate::validation::{rules, ArgField, InputErrors, PropertyError};
use crate::workflow::{DependencyManager, Language, Workflow};
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map};
use std::path::PathBuf;
use std::sync::OnceLock;

const MANIFEST_FILE: &str = "package.json";
const DEPENDENCIES_FOLDER: &str = "node_modules";
const ENTRY_EXTENSIONS: &[&str] = &["js", "ts"];
const BUNDLERS: &[&str] = &["npm-esbuild", "npm"];
const FORMATS: &[&str] = &["cjs", "esm", "iife"];
const DEFAULT_BUNDLER: &str = "npm-esbuild";
const DEFAULT_FORMAT: &str = "cjs";
/// SDK packages provided by the runtime and left out of the bundle.
const DEFAULT_EXTERNALS: &[&str] = &["@aws-sdk/*", "@smithy/*"];

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodejsArgs {
    /// Entry file, `.js` or `.ts`
    pub entry: String,
    pub runtime: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub package_json_path: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub node_modules_path: Option<String>,
    #[serde(default)]
    pub external: Option<Vec<String>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub architecture: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub bundler: Option<String>,
    /// Ship the SDK inside the bundle instead of using the runtime's copy
    #[serde(default)]
    pub bundle_aws_sdk: Option<bool>,
    #[serde(default)]
    pub minify: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub target: Option<String>,
}

impl NodejsArgs {
    fn bundler(&self) -> &str {
        self.bundler.as_deref().unwrap_or(DEFAULT_BUNDLER)
    }

    fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    fn externals(&self) -> Vec<String> {
        match &self.external {
            Some(external) if !external.is_empty() => external.clone(),
            _ if self.bundle_aws_sdk.unwrap_or(false) => Vec::new(),
            _ => DEFAULT_EXTERNALS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `nodejs20.x` => `node20`.
fn target_from_runtime(runtime: &str) -> Option<String> {
    static RUNTIME_VERSION: OnceLock<Regex> = OnceLock::new();
    let re = RUNTIME_VERSION
        .get_or_init(|| Regex::new(r"^nodejs(\d+)").expect("Invalid runtime regex"));
    re.captures(runtime).map(|caps| format!("node{}", &caps[1]))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NodejsAdapter;

impl BuildAdapter for NodejsAdapter {
    type Args = NodejsArgs;
    const FIELDS: &'static [ArgField] = &[
        ArgField::required("entry"),
        ArgField::required("runtime"),
        ArgField::optional("package_json_path"),
        ArgField::optional("node_modules_path"),
        ArgField::optional("external"),
        ArgField::optional("architecture"),
        ArgField::optional("bundler"),
        ArgField::optional("bundle_aws_sdk"),
        ArgField::optional("minify"),
        ArgField::optional("format"),
        ArgField::optional("target"),
    ];

    fn kind(&self) -> AdapterKind {
        AdapterKind::Nodejs
    }

    fn workflows(&self) -> Vec<Workflow> {
        vec![
            Workflow::new(Language::Nodejs, DependencyManager::NpmEsbuild),
            Workflow::new(Language::Nodejs, DependencyManager::Npm),
        ]
    }

    fn runtimes(&self) -> Vec<&'static str> {
        runtimes_with_prefix("nodejs", &[DEPRECATED_NODEJS_RUNTIME])
    }

    fn validate(&self, args: &NodejsArgs, ctx: &BuildContext) -> Result<Architecture, InputErrors> {
        let mut errors = InputErrors::new();
        errors.check(rules::runtime(&args.runtime, &self.runtimes()));
        errors.check(rules::one_of("bundler", "Bundler", args.bundler(), BUNDLERS));
        errors.check(rules::one_of("format", "Format", args.format(), FORMATS));
        let architecture = errors.collect(rules::architecture(args.architecture.as_deref()));
        errors.check(rules::entry_extension(&args.entry, ENTRY_EXTENSIONS));
        errors.check(rules::entry_exists(
            ctx.fs.as_ref(),
            &ctx.resolve(&args.entry),
            &args.entry,
        ));
        if let Some(node_modules) = &args.node_modules_path {
            if ctx.fs.is_file(&ctx.resolve(node_modules)) {
                errors.push(PropertyError::new(
                    "node_modules_path",
                    format!("node_modules path must be a directory, got {}", node_modules),
                ));
            }
        }
        errors.finish(architecture)
    }

    fn manifest_strategy(&self, args: &NodejsArgs, ctx: &BuildContext) -> ManifestStrategy {
        match &args.package_json_path {
            Some(explicit) => ManifestStrategy::Explicit {
                path: ctx.resolve(explicit),
                shown: explicit.clone(),
                property: "package_json_path",
                label: MANIFEST_FILE,
            },
            None => ManifestStrategy::UpwardSearch {
                filename: MANIFEST_FILE.to_string(),
                start_dir: ctx.working_dir.clone(),
                property: "package_json_path",
                policy: ManifestPolicy::Required,
            },
        }
    }

    fn dependency_layout(
        &self,
        resolved: &Resolved<'_, NodejsArgs>,
    ) -> Option<(PathBuf, DependencyLayout)> {
        let manifest = resolved.manifest.as_ref()?;
        let layout = DependencyLayout {
            folder: DEPENDENCIES_FOLDER,
            explicit: resolved
                .args
                .node_modules_path
                .as_ref()
                .map(|p| resolved.ctx.resolve(p)),
        };
        Some((manifest.project_dir.clone(), layout))
    }

    fn plan(&self, resolved: &Resolved<'_, NodejsArgs>) -> Result<BuildPlan, InputErrors> {
        let args = resolved.args;
        let manifest = resolved.manifest.as_ref().ok_or_else(|| {
            PropertyError::new(
                "package_json_path",
                "Cannot find package.json file. Please provide the path to the file",
            )
        })?;

        let target = match &args.target {
            Some(target) => target.clone(),
            None => target_from_runtime(&args.runtime).ok_or_else(|| {
                PropertyError::new(
                    "target",
                    "Could not determine the target from the runtime. Please provide the target",
                )
            })?,
        };

        let entry = paths::relative_to(&resolved.ctx.resolve(&args.entry), &manifest.project_dir);
        if entry.starts_with("..") {
            return Err(PropertyError::new(
                "entry",
                format!(
                    "Entry file must be inside the project directory {}",
                    manifest.project_dir.display()
                ),
            )
            .into());
        }
        let entry = entry
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let mut options = Map::new();
        options.insert("entry_points".to_string(), json!([entry]));
        options.insert("external".to_string(), json!(args.externals()));
        options.insert("minify".to_string(), json!(args.minify.unwrap_or(true)));
        options.insert("format".to_string(), json!(args.format()));
        options.insert("target".to_string(), json!(target));
        if args.format() == "esm" {
            options.insert("out_extensions".to_string(), json!([".js=.mjs"]));
        }

        let manager = match args.bundler() {
            "npm" => DependencyManager::Npm,
            _ => DependencyManager::NpmEsbuild,
        };

        Ok(BuildPlan::new(
            Workflow::new(Language::Nodejs, manager),
            manifest.project_dir.clone(),
            &args.runtime,
        )
        .with_manifest(Some(manifest.manifest_path.clone()))
        .with_options(options)
        .in_source())
    }

    fn masks_architecture_errors(&self) -> bool {
        true
    }
}
