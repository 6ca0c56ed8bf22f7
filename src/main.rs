use lambda_builders::cli::commands::{CliArgs, Commands};
use lambda_builders::cli::handlers::{handle_adapters, handle_batch, handle_build, handle_config};
use lambda_builders::util::{init_logging, LoggingConfig};
use lambda_builders::VERSION;

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_cli(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("lambda-builders v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args, args.quiet).await,
        Commands::Batch(batch_args) => handle_batch(batch_args, args.quiet).await,
        Commands::Adapters(adapters_args) => handle_adapters(adapters_args),
        Commands::Config(config_args) => handle_config(config_args),
    };

    std::process::exit(exit_code);
}
