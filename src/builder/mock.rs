use super::{BuildInvocation, Builder, BuilderError};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

/// In-process [`Builder`] for tests and dry runs.
///
/// Every invocation is recorded. Outcomes are taken from a queue; once the queue is empty
/// each build succeeds. Successful builds write the configured artifact files into the
/// artifacts directory so archivers have something to package.
pub struct MockBuilder {
    outcomes: Mutex<VecDeque<Result<(), BuilderError>>>,
    invocations: Mutex<Vec<BuildInvocation>>,
    artifacts: Vec<(PathBuf, String)>,
}

impl MockBuilder {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            invocations: Mutex::new(Vec::new()),
            artifacts: Vec::new(),
        }
    }

    pub fn failing(error: BuilderError) -> Self {
        let builder = Self::new();
        builder.add_outcome(Err(error));
        builder
    }

    pub fn with_artifact(mut self, relative: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.artifacts.push((relative.into(), content.into()));
        self
    }

    pub fn add_outcome(&self, outcome: Result<(), BuilderError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn invocations(&self) -> Vec<BuildInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn last_invocation(&self) -> Option<BuildInvocation> {
        self.invocations.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    pub fn remaining_outcomes(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    fn write_artifacts(&self, invocation: &BuildInvocation) -> Result<(), BuilderError> {
        for (relative, content) in &self.artifacts {
            let target = invocation.artifacts_dir.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BuilderError::WorkflowFailed(e.to_string()))?;
            }
            std::fs::write(&target, content)
                .map_err(|e| BuilderError::WorkflowFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Default for MockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder for MockBuilder {
    fn build(&self, invocation: &BuildInvocation) -> Result<(), BuilderError> {
        self.invocations.lock().unwrap().push(invocation.clone());

        let outcome = self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()));
        outcome?;
        self.write_artifacts(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtimes::Architecture;
    use crate::workflow::{Language, Workflow};
    use tempfile::TempDir;

    fn invocation(artifacts: PathBuf) -> BuildInvocation {
        BuildInvocation {
            workflow: Workflow::language_only(Language::Provided),
            source_dir: PathBuf::from("/src"),
            artifacts_dir: artifacts,
            scratch_dir: PathBuf::from("/scratch"),
            manifest_path: None,
            runtime: "provided".to_string(),
            architecture: Architecture::X86_64,
            options: None,
            download_dependencies: None,
            dependencies_dir: None,
            build_in_source: None,
            experimental_flags: Vec::new(),
        }
    }

    #[test]
    fn test_records_and_writes_artifacts() {
        let dir = TempDir::new().unwrap();
        let builder = MockBuilder::new().with_artifact("bin/bootstrap", "#!/bin/sh");

        builder.build(&invocation(dir.path().to_path_buf())).unwrap();

        assert_eq!(builder.call_count(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("bin/bootstrap")).unwrap(),
            "#!/bin/sh"
        );
        assert_eq!(
            builder.last_invocation().unwrap().artifacts_dir,
            dir.path().to_path_buf()
        );
    }

    #[test]
    fn test_queued_outcomes() {
        let dir = TempDir::new().unwrap();
        let builder = MockBuilder::failing(BuilderError::WorkflowFailed("boom".to_string()));
        builder.add_outcome(Ok(()));

        let first = builder.build(&invocation(dir.path().to_path_buf()));
        assert_eq!(first, Err(BuilderError::WorkflowFailed("boom".to_string())));
        assert_eq!(builder.remaining_outcomes(), 1);

        assert!(builder.build(&invocation(dir.path().to_path_buf())).is_ok());
        assert!(builder.build(&invocation(dir.path().to_path_buf())).is_ok());
        assert_eq!(builder.call_count(), 3);
    }
}
