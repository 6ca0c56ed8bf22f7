use crate::adapters::AdapterKind;
use crate::archive::ArchiveKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Build serverless function packages with per-language adapters
#[derive(Parser, Debug)]
#[command(
    name = "lambda-builders",
    about = "Build serverless function packages with per-language adapters",
    version,
    author,
    long_about = "lambda-builders validates build arguments for a runtime adapter, resolves the \
                  project manifest and dependency folders, hands the build to the external \
                  lambda-builders program and packages the result as a directory or zip asset."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity (can be used multiple times)"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build one function",
        long_about = "Validates the arguments for one adapter, runs the build and prints the \
                      resulting asset.\n\n\
                      Examples:\n  \
                      lambda-builders build go --set code=./api\n  \
                      lambda-builders build nodejs --args function.yaml --format json\n  \
                      cat args.json | lambda-builders build python --args -"
    )]
    Build(BuildArgs),

    #[command(
        about = "Build every function in a plan file",
        long_about = "Builds all functions listed in a YAML plan concurrently.\n\n\
                      Examples:\n  \
                      lambda-builders batch functions.yaml\n  \
                      lambda-builders batch functions.yaml --max-parallel 2 --format json"
    )]
    Batch(BatchArgs),

    #[command(about = "List available adapters")]
    Adapters(AdaptersArgs),

    #[command(about = "Show effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(value_name = "ADAPTER", value_parser = parse_adapter_kind, help = "Adapter to build with")]
    pub adapter: AdapterKind,

    #[arg(
        short = 'a',
        long = "args",
        value_name = "FILE",
        help = "JSON or YAML argument file ('-' reads stdin)"
    )]
    pub args_file: Option<PathBuf>,

    #[arg(
        short = 's',
        long = "set",
        value_name = "KEY=VALUE",
        help = "Set a single argument (repeatable, overrides the argument file)"
    )]
    pub set: Vec<String>,

    #[arg(
        short = 'n',
        long,
        value_name = "NAME",
        default_value = "function",
        help = "Resource name used in logs and output"
    )]
    pub name: String,

    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        help = "Resolve relative argument paths against DIR (defaults to current directory)"
    )]
    pub working_dir: Option<PathBuf>,

    #[arg(long, value_name = "KIND", value_parser = parse_archive_kind, help = "Package output as 'directory' or 'zip'")]
    pub archive: Option<ArchiveKind>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    #[arg(value_name = "PLAN", help = "YAML plan listing the functions to build")]
    pub plan: PathBuf,

    #[arg(
        short = 'j',
        long,
        value_name = "N",
        help = "Maximum concurrent builds (overrides LAMBDA_BUILDERS_MAX_PARALLEL)"
    )]
    pub max_parallel: Option<usize>,

    #[arg(long, value_name = "KIND", value_parser = parse_archive_kind, help = "Package output as 'directory' or 'zip'")]
    pub archive: Option<ArchiveKind>,

    #[arg(long, help = "Disable the progress spinner")]
    pub no_progress: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct AdaptersArgs {
    #[arg(value_name = "ADAPTER", value_parser = parse_adapter_kind, help = "Show only this adapter")]
    pub adapter: Option<AdapterKind>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    AdapterKind::from_name(&s.to_lowercase()).ok_or_else(|| {
        let valid: Vec<&str> = AdapterKind::all_variants()
            .iter()
            .map(AdapterKind::as_str)
            .collect();
        format!("Invalid adapter: {}. Valid options: {}", s, valid.join(", "))
    })
}

fn parse_archive_kind(s: &str) -> Result<ArchiveKind, String> {
    ArchiveKind::from_name(&s.to_lowercase())
        .ok_or_else(|| format!("Invalid archive kind: {}. Valid options: directory, zip", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_build_args() {
        let args = CliArgs::parse_from(["lambda-builders", "build", "go"]);
        match args.command {
            Commands::Build(build) => {
                assert_eq!(build.adapter, AdapterKind::Go);
                assert_eq!(build.format, OutputFormatArg::Human);
                assert_eq!(build.name, "function");
                assert!(build.args_file.is_none());
                assert!(build.set.is_empty());
                assert!(build.archive.is_none());
                assert!(build.working_dir.is_none());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_build_with_options() {
        let args = CliArgs::parse_from([
            "lambda-builders",
            "build",
            "node",
            "--args",
            "-",
            "--set",
            "entry=index.ts",
            "-s",
            "minify=false",
            "--name",
            "api",
            "-C",
            "/srv/app",
            "--archive",
            "zip",
            "--format",
            "json",
        ]);

        match args.command {
            Commands::Build(build) => {
                assert_eq!(build.adapter, AdapterKind::Nodejs);
                assert_eq!(build.args_file, Some(PathBuf::from("-")));
                assert_eq!(build.set, vec!["entry=index.ts", "minify=false"]);
                assert_eq!(build.name, "api");
                assert_eq!(build.working_dir, Some(PathBuf::from("/srv/app")));
                assert_eq!(build.archive, Some(ArchiveKind::Zip));
                assert_eq!(build.format, OutputFormatArg::Json);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_batch_command() {
        let args = CliArgs::parse_from([
            "lambda-builders",
            "batch",
            "plan.yaml",
            "-j",
            "2",
            "--no-progress",
        ]);
        match args.command {
            Commands::Batch(batch) => {
                assert_eq!(batch.plan, PathBuf::from("plan.yaml"));
                assert_eq!(batch.max_parallel, Some(2));
                assert!(batch.no_progress);
            }
            _ => panic!("Expected Batch command"),
        }
    }

    #[test]
    fn test_adapters_command() {
        let args = CliArgs::parse_from(["lambda-builders", "adapters", "make", "-f", "yaml"]);
        match args.command {
            Commands::Adapters(adapters) => {
                assert_eq!(adapters.adapter, Some(AdapterKind::Custom));
                assert_eq!(adapters.format, OutputFormatArg::Yaml);
            }
            _ => panic!("Expected Adapters command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["lambda-builders", "-v", "config"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["lambda-builders", "config", "-q"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["lambda-builders", "--log-level", "debug", "config"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = CliArgs::try_parse_from(["lambda-builders", "-v", "-q", "config"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_adapter_kind_parsing() {
        assert_eq!(parse_adapter_kind("golang"), Ok(AdapterKind::Go));
        assert_eq!(parse_adapter_kind("Python"), Ok(AdapterKind::Python));
        assert_eq!(parse_adapter_kind("dotnet"), Ok(AdapterKind::Dotnet));
        let err = parse_adapter_kind("cobol").unwrap_err();
        assert!(err.contains("Valid options: custom, dotnet, go"));
    }

    #[test]
    fn test_archive_kind_parsing() {
        assert_eq!(parse_archive_kind("dir"), Ok(ArchiveKind::Directory));
        assert_eq!(parse_archive_kind("ZIP"), Ok(ArchiveKind::Zip));
        assert!(parse_archive_kind("tar").is_err());
    }
}
