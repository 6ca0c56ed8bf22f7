//! Workflow identifiers passed to the builder.

use serde::Serialize;
use std::fmt;

crate::define_id_enum! {
    /// Language half of a builder capability
    Language {
        Nodejs => "nodejs" : "Node.js" | "node",
        Python => "python" : "Python",
        Java => "java" : "Java",
        Go => "go" : "Go" | "golang",
        Ruby => "ruby" : "Ruby",
        Dotnet => "dotnet" : ".NET",
        Rust => "rust" : "Rust",
        Provided => "provided" : "Custom" | "make",
    }
}

crate::define_id_enum! {
    /// Dependency manager half of a builder capability
    DependencyManager {
        NpmEsbuild => "npm-esbuild" : "npm + esbuild",
        Npm => "npm" : "NPM",
        Pip => "pip" : "Pip",
        Gradle => "gradle" : "Gradle",
        Maven => "maven" : "Maven",
        Modules => "modules" : "Go modules",
        Bundler => "bundler" : "Bundler",
        CliPackage => "cli-package" : "dotnet CLI",
        Cargo => "cargo" : "Cargo",
    }
}

/// Named build strategy, e.g. `python/pip` or `nodejs/npm-esbuild`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Workflow {
    pub language: Language,
    pub dependency_manager: Option<DependencyManager>,
    pub application_framework: Option<&'static str>,
}

impl Workflow {
    pub const fn new(language: Language, dependency_manager: DependencyManager) -> Self {
        Self {
            language,
            dependency_manager: Some(dependency_manager),
            application_framework: None,
        }
    }

    /// Capability without a dependency manager (Makefile-driven builds).
    pub const fn language_only(language: Language) -> Self {
        Self {
            language,
            dependency_manager: None,
            application_framework: None,
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dependency_manager {
            Some(manager) => write!(f, "{}/{}", self.language, manager),
            None => write!(f, "{}", self.language),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_display() {
        assert_eq!(
            Workflow::new(Language::Python, DependencyManager::Pip).to_string(),
            "python/pip"
        );
        assert_eq!(
            Workflow::new(Language::Dotnet, DependencyManager::CliPackage).to_string(),
            "dotnet/cli-package"
        );
        assert_eq!(Workflow::language_only(Language::Provided).to_string(), "provided");
    }

    #[test]
    fn test_capability_serialization() {
        let workflow = Workflow::new(Language::Nodejs, DependencyManager::NpmEsbuild);
        let json = serde_json::to_value(workflow).unwrap();
        assert_eq!(json["language"], "nodejs");
        assert_eq!(json["dependency_manager"], "npm-esbuild");
        assert!(json["application_framework"].is_null());
    }

    #[test]
    fn test_dependency_manager_from_name() {
        assert_eq!(
            DependencyManager::from_name("npm-esbuild"),
            Some(DependencyManager::NpmEsbuild)
        );
        assert_eq!(DependencyManager::from_name("yarn"), None);
        assert!("yarn".parse::<DependencyManager>().is_err());
    }
}
