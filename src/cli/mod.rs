pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AdaptersArgs, BatchArgs, BuildArgs, CliArgs, Commands, ConfigArgs};
pub use output::{OutputFormat, OutputFormatter};
