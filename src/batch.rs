//! Building every function of a plan file concurrently.
//!
//! Builds are blocking (the builder is a subprocess), so each one runs on a tokio
//! blocking task. A semaphore caps how many run at once.

use crate::adapters::{construct_value, AdapterKind, BuildContext, Constructed};
use crate::error::{ConstructError, Stage};
use crate::validation::PropertyError;
use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// A batch plan, usually read from YAML:
///
/// ```yaml
/// working_dir: .
/// functions:
///   - name: api
///     adapter: go
///     args:
///       code: ./api
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchPlan {
    /// Base for relative argument paths; relative to the plan file itself
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    pub functions: Vec<FunctionSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionSpec {
    pub name: String,
    pub adapter: AdapterKind,
    #[serde(default)]
    pub args: Value,
}

impl BatchPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan {}", path.display()))?;
        let mut plan: BatchPlan = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse plan {}", path.display()))?;

        let plan_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        plan.working_dir = Some(match plan.working_dir.take() {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => plan_dir.join(dir),
            None => plan_dir,
        });

        plan.check()?;
        Ok(plan)
    }

    fn check(&self) -> Result<()> {
        if self.functions.is_empty() {
            bail!("Plan defines no functions");
        }
        let mut seen = HashSet::new();
        for function in &self.functions {
            if !seen.insert(function.name.as_str()) {
                bail!("Duplicate function name in plan: {}", function.name);
            }
        }
        Ok(())
    }
}

/// Why a build did not produce an asset.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub name: String,
    pub adapter: AdapterKind,
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<PropertyError>,
    #[serde(skip)]
    pub exit_code: i32,
}

impl FailureReport {
    pub fn from_error(name: &str, adapter: AdapterKind, error: &ConstructError) -> Self {
        let (message, errors) = match error.input_errors() {
            Some(errors) => ("Invalid arguments".to_string(), errors.errors().to_vec()),
            None => (error.to_string(), Vec::new()),
        };
        Self {
            name: name.to_string(),
            adapter,
            stage: error.stage(),
            message,
            errors,
            exit_code: error.exit_code(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildReport {
    Built(Constructed),
    Failed(FailureReport),
}

impl BuildReport {
    pub fn new(name: &str, adapter: AdapterKind, result: Result<Constructed, ConstructError>) -> Self {
        match result {
            Ok(constructed) => BuildReport::Built(constructed),
            Err(e) => BuildReport::Failed(FailureReport::from_error(name, adapter, &e)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BuildReport::Built(c) => &c.name,
            BuildReport::Failed(f) => &f.name,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            BuildReport::Built(_) => 0,
            BuildReport::Failed(f) => f.exit_code,
        }
    }
}

/// Worst exit code among `reports`: 2 beats 1 beats 0.
pub fn exit_code(reports: &[BuildReport]) -> i32 {
    reports.iter().map(BuildReport::exit_code).max().unwrap_or(0)
}

/// Builds every function, at most `max_parallel` at a time. Reports keep plan order.
pub async fn run_batch(
    plan: BatchPlan,
    ctx: BuildContext,
    max_parallel: usize,
    progress: Option<ProgressBar>,
) -> Vec<BuildReport> {
    let ctx = match &plan.working_dir {
        Some(dir) => ctx.clone().with_working_dir(ctx.resolve(dir)),
        None => ctx,
    };
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    info!(functions = plan.functions.len(), max_parallel, "Starting batch build");

    let mut handles = Vec::with_capacity(plan.functions.len());
    for function in plan.functions {
        let semaphore = semaphore.clone();
        let ctx = ctx.clone();
        let progress = progress.clone();

        handles.push((
            function.name.clone(),
            function.adapter,
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                debug!(name = %function.name, "Build slot acquired");

                let args = match function.args {
                    Value::Null => Value::Object(Map::new()),
                    other => other,
                };
                let name = function.name.clone();
                let report = tokio::task::spawn_blocking(move || {
                    let result = construct_value(function.adapter, &name, args, &ctx);
                    BuildReport::new(&name, function.adapter, result)
                })
                .await;

                if let Some(progress) = &progress {
                    progress.inc(1);
                    progress.set_message(function.name.clone());
                }
                report
            }),
        ));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (name, adapter, handle) in handles {
        let report = match handle.await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) | Err(e) => {
                error!(name = %name, "Build task failed: {}", e);
                BuildReport::Failed(FailureReport {
                    name,
                    adapter,
                    stage: Stage::Building,
                    message: format!("Build task failed: {}", e),
                    errors: Vec::new(),
                    exit_code: 1,
                })
            }
        };
        reports.push(report);
    }

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuilderError, MockBuilder};
    use crate::fs::MockFileSystem;
    use tempfile::TempDir;

    fn context(builder: MockBuilder, temp: &TempDir) -> (BuildContext, Arc<MockFileSystem>) {
        let fs = Arc::new(MockFileSystem::new());
        let ctx = BuildContext::new(Arc::new(builder))
            .with_fs(fs.clone())
            .with_working_dir("/repo")
            .with_temp_root(temp.path());
        (ctx, fs)
    }

    fn plan(yaml: &str) -> BatchPlan {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_load_resolves_working_dir_against_plan() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.yaml");
        std::fs::write(
            &path,
            "working_dir: services\nfunctions:\n  - name: api\n    adapter: go\n    args:\n      code: api\n",
        )
        .unwrap();

        let plan = BatchPlan::load(&path).unwrap();
        assert_eq!(plan.working_dir, Some(temp.path().join("services")));
        assert_eq!(plan.functions[0].adapter, AdapterKind::Go);
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.yaml");
        std::fs::write(
            &path,
            "functions:\n  - {name: a, adapter: go}\n  - {name: a, adapter: rust}\n",
        )
        .unwrap();

        let err = BatchPlan::load(&path).unwrap_err();
        assert!(err.to_string().contains("Duplicate function name"));
    }

    #[tokio::test]
    async fn test_reports_keep_plan_order() {
        let temp = TempDir::new().unwrap();
        let (ctx, fs) = context(MockBuilder::new(), &temp);
        fs.add_dir("/repo/api");
        fs.add_dir("/repo/worker");

        let plan = plan(
            r#"
functions:
  - name: api
    adapter: go
    args: {code: api}
  - name: worker
    adapter: rust
    args: {code: worker, binary_name: worker}
  - name: broken
    adapter: java
    args: {code: missing, runtime: java21}
"#,
        );

        let reports = run_batch(plan, ctx, 2, None).await;
        let names: Vec<&str> = reports.iter().map(BuildReport::name).collect();
        assert_eq!(names, vec!["api", "worker", "broken"]);
        assert!(matches!(reports[0], BuildReport::Built(_)));
        assert!(matches!(reports[1], BuildReport::Built(_)));
        match &reports[2] {
            BuildReport::Failed(f) => {
                assert_eq!(f.stage, Stage::Validating);
                assert_eq!(f.errors[0].property_path, "code");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(exit_code(&reports), 2);
    }

    #[tokio::test]
    async fn test_build_failure_exit_code() {
        let temp = TempDir::new().unwrap();
        let builder = MockBuilder::failing(BuilderError::WorkflowFailed("boom".to_string()));
        let (ctx, fs) = context(builder, &temp);
        fs.add_dir("/repo/api");

        let plan = plan("functions:\n  - {name: api, adapter: go, args: {code: api}}\n");
        let reports = run_batch(plan, ctx, 4, None).await;

        assert_eq!(exit_code(&reports), 1);
        let json = serde_json::to_value(&reports[0]).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["message"], "Failed to build Go code: boom");
        assert!(json.get("exit_code").is_none());
    }

    #[test]
    fn test_built_report_serializes_status() {
        let report = BuildReport::Failed(FailureReport {
            name: "x".to_string(),
            adapter: AdapterKind::Python,
            stage: Stage::ResolvingManifest,
            message: "Invalid arguments".to_string(),
            errors: vec![PropertyError::new("requirements_path", "nope")],
            exit_code: 2,
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stage"], "resolving_manifest");
        assert_eq!(json["errors"][0]["property_path"], "requirements_path");
        assert_eq!(exit_code(&[report]), 2);
    }
}
