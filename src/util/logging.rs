//! Structured logging setup.
//!
//! Logs go to stderr so that the `build` and `batch` commands can print machine readable
//! results on stdout. Filtering honours `RUST_LOG`; without it only this crate's events
//! at the configured level are shown.
//!
//! # Example
//!
//! ```no_run
//! use lambda_builders::util::logging;
//!
//! // With environment: LAMBDA_BUILDERS_LOG_LEVEL=debug
//! logging::init_from_env();
//!
//! tracing::info!(adapter = "python", "Building");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's events
    pub level: Level,

    /// One JSON object per event instead of human-readable lines
    pub use_json: bool,

    /// Include the module target (e.g., lambda_builders::dispatch) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,

    pub include_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
            include_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with source locations and thread ids, for log collectors.
    pub fn production() -> Self {
        Self {
            level: Level::INFO,
            use_json: true,
            include_target: true,
            include_location: true,
            include_thread_ids: true,
        }
    }

    /// Level chosen from CLI flags: an explicit level wins, then `-v`, then `-q`, then
    /// `LAMBDA_BUILDERS_LOG_LEVEL`.
    pub fn from_cli(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let level = match log_level {
            Some(level) => parse_level(level),
            None if verbose => Level::DEBUG,
            None if quiet => Level::ERROR,
            None => env_level(),
        };

        Self {
            level,
            use_json: env_json(),
            ..Default::default()
        }
    }

    fn filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            if let Ok(directive) = format!("lambda_builders={}", self.level).parse::<Directive>() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }
}

/// Parses a log level, falling back to INFO.
///
/// ```
/// use lambda_builders::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("chatty"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn env_level() -> Level {
    let level_str = env::var("LAMBDA_BUILDERS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    parse_level(&level_str)
}

fn env_json() -> bool {
    env::var("LAMBDA_BUILDERS_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

/// Installs the global subscriber. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter();

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_thread_ids(config.include_thread_ids)
                        .with_thread_names(config.include_thread_ids),
                )
                .init();
        }
    });
}

/// Reads `LAMBDA_BUILDERS_LOG_LEVEL` and `LAMBDA_BUILDERS_LOG_JSON`.
pub fn init_from_env() {
    init_logging(LoggingConfig {
        level: env_level(),
        use_json: env_json(),
        ..Default::default()
    });
}
