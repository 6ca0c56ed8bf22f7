//! Output formatting for build reports, adapter listings and configuration.
//!
//! JSON and YAML are meant for scripts and hosts; the human format is a short
//! tree-style summary.

use anyhow::{Context, Result};
use std::collections::BTreeMap;

use crate::adapters::AdapterInfo;
use crate::batch::{BuildReport, FailureReport};
use crate::config::BuilderConfig;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the outcome of a single build
    pub fn format_report(&self, report: &BuildReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize build report to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize build report to YAML")
            }
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    /// Formats the outcomes of a batch, in plan order
    pub fn format_reports(&self, reports: &[BuildReport]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(reports)
                .context("Failed to serialize build reports to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(reports).context("Failed to serialize build reports to YAML")
            }
            OutputFormat::Human => Ok(self.format_reports_human(reports)),
        }
    }

    pub fn format_adapters(&self, adapters: &[AdapterInfo]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(adapters)
                .context("Failed to serialize adapters to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(adapters).context("Failed to serialize adapters to YAML")
            }
            OutputFormat::Human => Ok(self.format_adapters_human(adapters)),
        }
    }

    pub fn format_config(&self, config: &BuilderConfig) -> Result<String> {
        let config_map: BTreeMap<String, String> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config_map)
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&config_map).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(self.format_config_human(&config_map)),
        }
    }

    fn format_report_human(&self, report: &BuildReport) -> String {
        let mut output = String::new();

        match report {
            BuildReport::Built(built) => {
                output.push_str(&format!("\u{2713} Built {}\n", built.name));
                output.push_str(RULE);
                output.push_str("\n\n");
                output.push_str(&format!("Adapter:       {}\n", built.adapter.name()));
                output.push_str(&format!("Workflow:      {}\n", built.workflow));
                output.push_str(&format!("Runtime:       {}\n", built.runtime));
                output.push_str(&format!("Architecture:  {}\n\n", built.architecture));

                output.push_str("Asset:\n");
                let asset = &built.asset;
                let mut lines = vec![
                    format!("Kind:    {}", asset.kind.name()),
                    format!("Path:    {}", asset.path.display()),
                ];
                if let Some(size) = asset.size {
                    lines.push(format!("Size:    {} bytes", size));
                }
                if let Some(ref sha) = asset.sha256 {
                    lines.push(format!("SHA-256: {}", sha));
                }
                push_tree(&mut output, &lines);
            }
            BuildReport::Failed(failed) => self.push_failure(&mut output, failed),
        }

        output
    }

    fn push_failure(&self, output: &mut String, failed: &FailureReport) {
        output.push_str(&format!("\u{2717} Failed {}\n", failed.name));
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Adapter:  {}\n", failed.adapter.name()));
        output.push_str(&format!("Stage:    {}\n", failed.stage));
        output.push_str(&format!("Error:    {}\n", failed.message));

        if !failed.errors.is_empty() {
            output.push_str("\nInvalid properties:\n");
            let lines: Vec<String> = failed
                .errors
                .iter()
                .map(|e| {
                    if e.property_path.is_empty() {
                        e.reason.clone()
                    } else {
                        format!("{}: {}", e.property_path, e.reason)
                    }
                })
                .collect();
            push_tree(output, &lines);
        }
    }

    fn format_reports_human(&self, reports: &[BuildReport]) -> String {
        let mut output = String::new();
        let built = reports
            .iter()
            .filter(|r| matches!(r, BuildReport::Built(_)))
            .count();

        output.push_str(&format!(
            "Batch: {} built, {} failed\n",
            built,
            reports.len() - built
        ));
        output.push_str(RULE);
        output.push_str("\n\n");

        for report in reports {
            match report {
                BuildReport::Built(c) => output.push_str(&format!(
                    "\u{2713} {}  {}  {}\n",
                    c.name,
                    c.workflow,
                    c.asset.path.display()
                )),
                BuildReport::Failed(f) => output.push_str(&format!(
                    "\u{2717} {}  [{}]  {}\n",
                    f.name, f.stage, f.message
                )),
            }
            if let BuildReport::Failed(f) = report {
                for e in &f.errors {
                    output.push_str(&format!("    - {}: {}\n", e.property_path, e.reason));
                }
            }
        }

        output
    }

    fn format_adapters_human(&self, adapters: &[AdapterInfo]) -> String {
        let mut output = String::new();

        output.push_str("Available Adapters\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for info in adapters {
            output.push_str(&format!("{} ({})\n", info.name, info.kind));
            let runtimes = if info.runtimes.is_empty() {
                "provided (fixed)".to_string()
            } else {
                info.runtimes.join(", ")
            };
            push_tree(
                &mut output,
                &[
                    format!("Type:      {}", info.type_token),
                    format!("Workflows: {}", info.workflows.join(", ")),
                    format!("Runtimes:  {}", runtimes),
                ],
            );
            output.push('\n');
        }

        output
    }

    fn format_config_human(&self, config_map: &BTreeMap<String, String>) -> String {
        let mut output = String::new();

        output.push_str("lambda-builders Configuration\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str("Builder:\n");
        if let Some(bin) = config_map.get("builder_bin") {
            output.push_str(&format!("  Executable: {}\n", bin));
        }
        if let Some(paths) = config_map.get("search_paths") {
            output.push_str(&format!("  Search paths: {}\n", paths));
        }

        output.push_str("\nWorkspace:\n");
        if let Some(temp) = config_map.get("temp_dir") {
            output.push_str(&format!("  Temp dir: {}\n", temp));
        }
        if let Some(archive) = config_map.get("archive") {
            output.push_str(&format!("  Archive: {}\n", archive));
        }
        if let Some(parallel) = config_map.get("max_parallel") {
            output.push_str(&format!("  Max parallel: {}\n", parallel));
        }

        output.push_str("\nLogging:\n");
        if let Some(level) = config_map.get("log_level") {
            output.push_str(&format!("  Level: {}\n", level));
        }

        output
    }
}

fn push_tree(output: &mut String, lines: &[String]) {
    for (i, line) in lines.iter().enumerate() {
        let connector = if i == lines.len() - 1 {
            "\u{2514}"
        } else {
            "\u{251C}"
        };
        output.push_str(&format!("{}\u{2500} {}\n", connector, line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{describe, AdapterKind, Constructed};
    use crate::archive::{ArchiveHandle, ArchiveKind};
    use crate::error::Stage;
    use crate::runtimes::Architecture;
    use crate::validation::PropertyError;
    use crate::workflow::{DependencyManager, Language, Workflow};
    use std::path::PathBuf;

    fn built() -> BuildReport {
        BuildReport::Built(Constructed {
            name: "api".to_string(),
            adapter: AdapterKind::Python,
            workflow: Workflow::new(Language::Python, DependencyManager::Pip),
            runtime: "python3.12".to_string(),
            architecture: Architecture::Arm64,
            asset: ArchiveHandle {
                kind: ArchiveKind::Zip,
                path: PathBuf::from("/tmp/lambda-artifacts-abc.zip"),
                size: Some(1234),
                sha256: Some("deadbeef".to_string()),
            },
        })
    }

    fn failed() -> BuildReport {
        BuildReport::Failed(FailureReport {
            name: "worker".to_string(),
            adapter: AdapterKind::Nodejs,
            stage: Stage::Validating,
            message: "Invalid arguments".to_string(),
            errors: vec![PropertyError::new(
                "architecture",
                "Architecture must be one of arm64, x86_64",
            )],
            exit_code: 2,
        })
    }

    #[test]
    fn test_json_report() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_report(&built()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["status"], "built");
        assert_eq!(value["workflow"]["language"], "python");
        assert_eq!(value["asset"]["sha256"], "deadbeef");
    }

    #[test]
    fn test_yaml_reports() {
        let formatter = OutputFormatter::new(OutputFormat::Yaml);
        let output = formatter.format_reports(&[built(), failed()]).unwrap();

        assert!(output.contains("status: built"));
        assert!(output.contains("status: failed"));
        assert!(output.contains("property_path: architecture"));
    }

    #[test]
    fn test_human_report() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_report(&built()).unwrap();

        assert!(output.starts_with("\u{2713} Built api"));
        assert!(output.contains("Workflow:      python/pip"));
        assert!(output.contains("Architecture:  arm64"));
        assert!(output.contains("\u{2514}\u{2500} SHA-256: deadbeef"));
    }

    #[test]
    fn test_human_failure() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_report(&failed()).unwrap();

        assert!(output.contains("Stage:    validating"));
        assert!(output.contains("architecture: Architecture must be one of arm64, x86_64"));
    }

    #[test]
    fn test_human_batch_summary() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_reports(&[built(), failed()]).unwrap();

        assert!(output.starts_with("Batch: 1 built, 1 failed"));
        assert!(output.contains("\u{2717} worker  [validating]"));
    }

    #[test]
    fn test_adapters_listing() {
        let adapters = vec![describe(AdapterKind::Go), describe(AdapterKind::Java)];

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_adapters(&adapters)
            .unwrap();
        assert!(human.contains("lambda-builders:index:BuildGo"));
        assert!(human.contains("provided (fixed)"));
        assert!(human.contains("java/gradle"));

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_adapters(&adapters)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "go");
    }
}
