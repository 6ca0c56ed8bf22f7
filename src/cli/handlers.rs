//! Subcommand handlers. Each returns the process exit code.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::commands::{AdaptersArgs, BatchArgs, BuildArgs, ConfigArgs};
use super::output::OutputFormatter;
use crate::adapters::{construct_value, describe, AdapterKind, BuildContext};
use crate::archive::{self, ArchiveKind};
use crate::batch::{self, BatchPlan, BuildReport};
use crate::config::BuilderConfig;

const EXIT_FAILURE: i32 = 1;
const EXIT_INVALID: i32 = 2;

pub async fn handle_build(args: &BuildArgs, quiet: bool) -> i32 {
    let config = BuilderConfig::default();
    let ctx = match prepare_context(&config, args.archive) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };
    let ctx = match &args.working_dir {
        Some(dir) => ctx.clone().with_working_dir(ctx.resolve(dir)),
        None => ctx,
    };

    let values = match load_args(args.args_file.as_deref(), &args.set) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_INVALID;
        }
    };
    debug!(adapter = %args.adapter, "Arguments: {}", values);

    let spinner = if quiet || !atty::is(atty::Stream::Stderr) {
        None
    } else {
        Some(spinner(format!(
            "Building {} with the {} adapter",
            args.name,
            args.adapter.name()
        )))
    };

    let name = args.name.clone();
    let kind = args.adapter;
    let report = tokio::task::spawn_blocking(move || {
        BuildReport::new(&name, kind, construct_value(kind, &name, values, &ctx))
    })
    .await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("Build task failed: {}", e);
            return EXIT_FAILURE;
        }
    };

    print_output(
        OutputFormatter::new(args.format.into()).format_report(&report),
        report.exit_code(),
    )
}

pub async fn handle_batch(args: &BatchArgs, quiet: bool) -> i32 {
    let config = BuilderConfig::default();
    let ctx = match prepare_context(&config, args.archive) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    let plan = match BatchPlan::load(&args.plan) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_INVALID;
        }
    };

    let max_parallel = args.max_parallel.unwrap_or(config.max_parallel).max(1);
    let progress = if quiet || args.no_progress || !atty::is(atty::Stream::Stderr) {
        None
    } else {
        Some(progress_bar(plan.functions.len() as u64))
    };

    let reports = batch::run_batch(plan, ctx, max_parallel, progress).await;
    let exit_code = batch::exit_code(&reports);
    info!(
        functions = reports.len(),
        exit_code, "Batch build finished"
    );

    print_output(
        OutputFormatter::new(args.format.into()).format_reports(&reports),
        exit_code,
    )
}

pub fn handle_adapters(args: &AdaptersArgs) -> i32 {
    let kinds: Vec<AdapterKind> = match args.adapter {
        Some(kind) => vec![kind],
        None => AdapterKind::all_variants().to_vec(),
    };
    let adapters: Vec<_> = kinds.into_iter().map(describe).collect();

    print_output(
        OutputFormatter::new(args.format.into()).format_adapters(&adapters),
        0,
    )
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = BuilderConfig::default();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return EXIT_FAILURE;
    }

    print_output(
        OutputFormatter::new(args.format.into()).format_config(&config),
        0,
    )
}

fn prepare_context(config: &BuilderConfig, archive: Option<ArchiveKind>) -> Result<BuildContext> {
    config.validate().context("Invalid configuration")?;
    let ctx = BuildContext::from_config(config).context("Invalid configuration")?;
    Ok(match archive {
        Some(kind) => ctx.with_archiver(Arc::from(archive::for_kind(kind))),
        None => ctx,
    })
}

fn print_output(formatted: Result<String>, exit_code: i32) -> i32 {
    match formatted {
        Ok(output) => {
            println!("{}", output.trim_end());
            exit_code
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Reads adapter arguments from a JSON/YAML file (`-` for stdin) and applies
/// `key=value` overrides. Override values are parsed as YAML scalars, so
/// `minify=false` yields a boolean and `external=[a, b]` a list.
pub fn load_args(file: Option<&Path>, overrides: &[String]) -> Result<Value> {
    let mut args = match file {
        Some(path) => {
            let content = if path == Path::new("-") {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read arguments from stdin")?;
                buf
            } else {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read arguments from {}", path.display()))?
            };
            parse_args(&content)?
        }
        None => Map::new(),
    };

    for item in overrides {
        let (key, raw) = item
            .split_once('=')
            .with_context(|| format!("Invalid --set '{}': expected KEY=VALUE", item))?;
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid --set '{}': empty key", item);
        }
        let value: Value = if raw.is_empty() {
            Value::String(String::new())
        } else {
            serde_yaml::from_str(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()))
        };
        args.insert(key.to_string(), value);
    }

    Ok(Value::Object(args))
}

fn parse_args(content: &str) -> Result<Map<String, Value>> {
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_yaml::from_str(content).context("Failed to parse arguments")?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => bail!("Arguments must be a mapping, got {}", type_name(&other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
