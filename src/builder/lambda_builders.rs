//! [`Builder`] backed by the `lambda-builders` executable.
//!
//! The executable takes one JSON-RPC 2.0 request as its only argument and prints a
//! single response object on stdout. Its own logging goes to stderr.

use super::{BuildInvocation, Builder, BuilderError};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const PROTOCOL_VERSION: &str = "0.3";
pub const BUILD_METHOD: &str = "LambdaBuilder.build";
pub const DEFAULT_PROGRAM: &str = "lambda-builders";

const UNSUPPORTED_ARCHITECTURE: &str = "UnsupportedArchitectureError";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: Option<i64>,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

pub struct LambdaBuildersCli {
    program: PathBuf,
    executable_search_paths: Vec<PathBuf>,
}

impl LambdaBuildersCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            executable_search_paths: Vec::new(),
        }
    }

    /// Extra directories the builder searches for toolchain executables.
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.executable_search_paths = paths;
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    pub fn request(&self, invocation: &BuildInvocation, id: &str) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": BUILD_METHOD,
            "params": {
                "__protocol_version": PROTOCOL_VERSION,
                "capability": invocation.workflow,
                "source_dir": invocation.source_dir,
                "artifacts_dir": invocation.artifacts_dir,
                "scratch_dir": invocation.scratch_dir,
                "manifest_path": invocation.manifest_path,
                "runtime": invocation.runtime,
                "architecture": invocation.architecture,
                "optimizations": {},
                "options": invocation.options,
                "executable_search_paths": self.executable_search_paths,
                "mode": Value::Null,
                "download_dependencies": invocation.download_dependencies.unwrap_or(true),
                "dependencies_dir": invocation.dependencies_dir,
                "build_in_source": invocation.build_in_source,
                "experimental_flags": invocation.experimental_flags,
            }
        })
    }
}

impl Default for LambdaBuildersCli {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Builder for LambdaBuildersCli {
    fn build(&self, invocation: &BuildInvocation) -> Result<(), BuilderError> {
        let id = Uuid::new_v4().to_string();
        let request = self.request(invocation, &id);

        info!(
            workflow = %invocation.workflow,
            runtime = %invocation.runtime,
            architecture = %invocation.architecture,
            source_dir = %invocation.source_dir.display(),
            "Invoking builder"
        );
        debug!(request_id = %id, program = %self.program.display(), "Builder request: {}", request);

        let output = Command::new(&self.program)
            .arg(request.to_string())
            .output()
            .map_err(|e| BuilderError::Unavailable {
                program: self.program.display().to_string(),
                message: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(request_id = %id, "builder: {}", line);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_response(&stdout) {
            Ok(outcome) => outcome,
            Err(protocol) if output.status.success() => Err(protocol),
            Err(_) => {
                let detail = stderr
                    .lines()
                    .rev()
                    .find(|l| !l.trim().is_empty())
                    .unwrap_or("no output")
                    .trim()
                    .to_string();
                warn!(request_id = %id, status = %output.status, "Builder exited without a response");
                Err(BuilderError::WorkflowFailed(format!(
                    "builder exited with {}: {}",
                    output.status, detail
                )))
            }
        }
    }
}

/// Interprets the builder's stdout. The outer `Err` means the output was not a response
/// at all; the inner result is the build outcome the response reports.
fn parse_response(stdout: &str) -> Result<Result<(), BuilderError>, BuilderError> {
    let line = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| BuilderError::Protocol("empty response".to_string()))?;

    let response: RpcResponse = serde_json::from_str(line.trim())
        .map_err(|e| BuilderError::Protocol(format!("{}: {}", e, line.trim())))?;

    match (response.error, response.result) {
        (Some(error), _) => Ok(Err(classify(error))),
        (None, Some(_)) => Ok(Ok(())),
        (None, None) => Err(BuilderError::Protocol(
            "response carries neither result nor error".to_string(),
        )),
    }
}

fn classify(error: RpcError) -> BuilderError {
    let error_type = error
        .data
        .as_ref()
        .and_then(|d| d.get("error_type"))
        .and_then(Value::as_str);

    debug!(code = ?error.code, error_type = ?error_type, "Builder reported an error");

    if error_type == Some(UNSUPPORTED_ARCHITECTURE) || error.message.contains(UNSUPPORTED_ARCHITECTURE)
    {
        BuilderError::UnsupportedArchitecture(error.message)
    } else {
        BuilderError::WorkflowFailed(error.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtimes::Architecture;
    use crate::workflow::{DependencyManager, Language, Workflow};
    use serde_json::Map;

    fn invocation() -> BuildInvocation {
        let mut options = Map::new();
        options.insert("build_logical_id".to_string(), json!("HelloWorld"));

        BuildInvocation {
            workflow: Workflow::new(Language::Python, DependencyManager::Pip),
            source_dir: PathBuf::from("/proj/app"),
            artifacts_dir: PathBuf::from("/tmp/artifacts"),
            scratch_dir: PathBuf::from("/tmp/scratch"),
            manifest_path: Some(PathBuf::from("/proj/requirements.txt")),
            runtime: "python3.12".to_string(),
            architecture: Architecture::Arm64,
            options: Some(options),
            download_dependencies: None,
            dependencies_dir: None,
            build_in_source: Some(true),
            experimental_flags: vec!["experimentalCargoLambda".to_string()],
        }
    }

    #[test]
    fn test_request_shape() {
        let cli = LambdaBuildersCli::default().with_search_paths(vec![PathBuf::from("/opt/bin")]);
        let request = cli.request(&invocation(), "req-1");

        assert_eq!(request["method"], BUILD_METHOD);
        assert_eq!(request["id"], "req-1");
        let params = &request["params"];
        assert_eq!(params["__protocol_version"], PROTOCOL_VERSION);
        assert_eq!(params["capability"]["language"], "python");
        assert_eq!(params["capability"]["dependency_manager"], "pip");
        assert_eq!(params["manifest_path"], "/proj/requirements.txt");
        assert_eq!(params["architecture"], "arm64");
        assert_eq!(params["download_dependencies"], true);
        assert_eq!(params["build_in_source"], true);
        assert_eq!(params["options"]["build_logical_id"], "HelloWorld");
        assert_eq!(params["executable_search_paths"][0], "/opt/bin");
        assert_eq!(params["experimental_flags"][0], "experimentalCargoLambda");
    }

    #[test]
    fn test_parse_success() {
        let stdout = r#"{"jsonrpc": "2.0", "id": "1", "result": {"artifacts_dir": "/tmp/a"}}"#;
        assert_eq!(parse_response(stdout), Ok(Ok(())));
    }

    #[test]
    fn test_parse_ignores_leading_noise() {
        let stdout = "some banner\n{\"id\": \"1\", \"result\": {}}\n\n";
        assert_eq!(parse_response(stdout), Ok(Ok(())));
    }

    #[test]
    fn test_parse_unsupported_architecture() {
        let stdout = r#"{"id": "1", "error": {"code": 400, "message": "Architecture arm64 is not supported", "data": {"error_type": "UnsupportedArchitectureError"}}}"#;
        assert_eq!(
            parse_response(stdout),
            Ok(Err(BuilderError::UnsupportedArchitecture(
                "Architecture arm64 is not supported".to_string()
            )))
        );
    }

    #[test]
    fn test_parse_workflow_failure() {
        let stdout = r#"{"id": "1", "error": {"code": 400, "message": "PythonPipBuilder:ResolveDependencies - pip failed"}}"#;
        assert_eq!(
            parse_response(stdout),
            Ok(Err(BuilderError::WorkflowFailed(
                "PythonPipBuilder:ResolveDependencies - pip failed".to_string()
            )))
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_response(""), Err(BuilderError::Protocol(_))));
        assert!(matches!(parse_response("not json"), Err(BuilderError::Protocol(_))));
        assert!(matches!(parse_response("{}"), Err(BuilderError::Protocol(_))));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let cli = LambdaBuildersCli::new("/nonexistent/lambda-builders-binary");
        let err = cli.build(&invocation()).unwrap_err();
        assert!(matches!(err, BuilderError::Unavailable { .. }));
    }
}
