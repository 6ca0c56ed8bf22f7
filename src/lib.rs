//! lambda-builders - per-language build adapters for serverless functions
//!
//! Every adapter follows the same contract: validate the arguments, resolve the
//! project manifest, detect pre-installed dependencies, hand the build to a
//! [`Builder`](builder::Builder) and package the artifacts with an
//! [`Archiver`](archive::Archiver).
//!
//! # Example Usage
//!
//! ```ignore
//! use lambda_builders::{construct_value, AdapterKind, BuildContext, BuilderConfig};
//! use serde_json::json;
//!
//! let ctx = BuildContext::from_config(&BuilderConfig::default())?;
//! let built = construct_value(
//!     AdapterKind::Python,
//!     "api",
//!     json!({"code": "./api", "runtime": "python3.12"}),
//!     &ctx,
//! )?;
//! println!("{}", built.asset.path.display());
//! ```
//!
//! # Project Structure
//!
//! - [`adapters`]: the eight runtime adapters and the shared `construct` driver
//! - [`validation`], [`manifest`], [`dependencies`]: the pre-build stages
//! - [`dispatch`], [`builder`]: temp workspaces and the external builder
//! - [`archive`]: packaging of the artifacts directory
//! - [`batch`]: concurrent builds of a plan file

#[macro_use]
pub mod id_enum_macro;

pub mod adapters;
pub mod archive;
pub mod batch;
pub mod builder;
pub mod cli;
pub mod config;
pub mod dependencies;
pub mod dispatch;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod paths;
pub mod runtimes;
pub mod search;
pub mod util;
pub mod validation;
pub mod workflow;

pub use adapters::{construct_value, describe, AdapterInfo, AdapterKind, BuildContext, Constructed};
pub use archive::{ArchiveHandle, ArchiveKind, Archiver, DirectoryArchiver, ZipArchiver};
pub use batch::{run_batch, BatchPlan, BuildReport};
pub use builder::{BuildInvocation, Builder, BuilderError, LambdaBuildersCli, MockBuilder};
pub use config::{BuilderConfig, ConfigError};
pub use error::{BuildFailure, ConstructError, Stage};
pub use runtimes::Architecture;
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use validation::{InputErrors, PropertyError};
pub use workflow::Workflow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
