//! Error families surfaced by `construct`.
//!
//! Validation problems ([`InputErrors`]) are found before any directory is created and
//! carry every offending property. Build problems ([`BuildFailure`]) are single and
//! terminal. [`ConstructError`] wraps both and remembers which [`Stage`] failed.

use crate::validation::InputErrors;
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;

/// Progress of one `construct` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Created,
    Validating,
    ResolvingManifest,
    DetectingDependencies,
    Building,
    Packaging,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Created => "created",
            Stage::Validating => "validating",
            Stage::ResolvingManifest => "resolving_manifest",
            Stage::DetectingDependencies => "detecting_dependencies",
            Stage::Building => "building",
            Stage::Packaging => "packaging",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A toolchain failure reported by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildFailure {
    #[error("Unsupported architecture")]
    UnsupportedArchitecture,

    #[error("Failed to build {runtime} code: {message}")]
    Failed { runtime: String, message: String },
}

#[derive(Debug, Error)]
pub enum ConstructError {
    #[error("{errors}")]
    Invalid { stage: Stage, errors: InputErrors },

    #[error(transparent)]
    Build(#[from] BuildFailure),

    #[error("Failed to prepare build directories: {0}")]
    Workspace(#[source] io::Error),

    #[error("Failed to package build output: {0:#}")]
    Archive(anyhow::Error),
}

impl ConstructError {
    pub fn invalid(stage: Stage, errors: InputErrors) -> Self {
        ConstructError::Invalid { stage, errors }
    }

    /// The stage the invocation was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            ConstructError::Invalid { stage, .. } => *stage,
            ConstructError::Build(_) | ConstructError::Workspace(_) => Stage::Building,
            ConstructError::Archive(_) => Stage::Packaging,
        }
    }

    pub fn input_errors(&self) -> Option<&InputErrors> {
        match self {
            ConstructError::Invalid { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ConstructError::Invalid { .. })
    }

    /// Process exit code: 2 for bad input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        if self.is_validation() {
            2
        } else {
            1
        }
    }
}
