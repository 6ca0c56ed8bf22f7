//! Runtime identifiers and target architectures understood by the builder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every runtime identifier the underlying builder accepts.
pub const SUPPORTED_RUNTIMES: &[&str] = &[
    "nodejs16.x",
    "nodejs18.x",
    "nodejs20.x",
    "nodejs22.x",
    "python3.8",
    "python3.9",
    "python3.10",
    "python3.11",
    "python3.12",
    "python3.13",
    "ruby3.2",
    "ruby3.3",
    "java8",
    "java8.al2",
    "java11",
    "java17",
    "java21",
    "dotnet6",
    "dotnet8",
    "go1.x",
    "provided",
    "provided.al2",
    "provided.al2023",
];

/// Runtime passed to the builder by adapters that produce a native bootstrap binary.
pub const PROVIDED_RUNTIME: &str = "provided";

/// Node.js runtime that is still listed by the builder but no longer deployable.
pub const DEPRECATED_NODEJS_RUNTIME: &str = "nodejs16.x";

/// Supported runtimes whose identifier starts with `prefix`, minus any in `excluded`.
pub fn runtimes_with_prefix(prefix: &str, excluded: &[&str]) -> Vec<&'static str> {
    SUPPORTED_RUNTIMES
        .iter()
        .copied()
        .filter(|runtime| runtime.starts_with(prefix) && !excluded.contains(runtime))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Architecture {
    #[default]
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "arm64")]
    Arm64,
}

impl Architecture {
    pub const ALL: [Architecture; 2] = [Architecture::Arm64, Architecture::X86_64];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86_64 => "x86_64",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Parses an architecture argument; absent or empty means the `x86_64` default.
    pub fn resolve(value: Option<&str>) -> Result<Self, String> {
        match value {
            None | Some("") => Ok(Architecture::default()),
            Some("x86_64") => Ok(Architecture::X86_64),
            Some("arm64") => Ok(Architecture::Arm64),
            Some(other) => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodejs_runtimes_exclude_deprecated() {
        let runtimes = runtimes_with_prefix("nodejs", &[DEPRECATED_NODEJS_RUNTIME]);
        assert!(runtimes.contains(&"nodejs18.x"));
        assert!(runtimes.contains(&"nodejs22.x"));
        assert!(!runtimes.contains(&"nodejs16.x"));
    }

    #[test]
    fn test_python_runtimes() {
        let runtimes = runtimes_with_prefix("python", &[]);
        assert_eq!(runtimes.first(), Some(&"python3.8"));
        assert!(runtimes.iter().all(|r| r.starts_with("python")));
    }

    #[test]
    fn test_architecture_defaults() {
        assert_eq!(Architecture::resolve(None), Ok(Architecture::X86_64));
        assert_eq!(Architecture::resolve(Some("")), Ok(Architecture::X86_64));
        assert_eq!(Architecture::resolve(Some("arm64")), Ok(Architecture::Arm64));
        assert_eq!(
            Architecture::resolve(Some("aarch64")),
            Err("aarch64".to_string())
        );
    }

    #[test]
    fn test_architecture_serialization() {
        assert_eq!(
            serde_json::to_string(&Architecture::X86_64).unwrap(),
            "\"x86_64\""
        );
        assert_eq!(Architecture::Arm64.to_string(), "arm64");
    }
}
