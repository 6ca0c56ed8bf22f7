//! Manifest discovery.
//!
//! Each adapter describes how its dependency manifest is found with a
//! [`ManifestStrategy`]; [`resolve`] turns that description into a
//! [`ManifestLocation`] or a validation error naming the offending property.

use crate::fs::FileSystem;
use crate::search::find_up;
use crate::validation::InputErrors;
use crate::workflow::DependencyManager;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A resolved manifest. `project_dir` is always the manifest's parent directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestLocation {
    pub manifest_path: PathBuf,
    pub project_dir: PathBuf,
    /// Dependency manager implied by the manifest that matched, when it varies.
    pub dependency_manager: Option<DependencyManager>,
}

impl ManifestLocation {
    pub fn new(manifest_path: PathBuf, dependency_manager: Option<DependencyManager>) -> Self {
        let project_dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            manifest_path,
            project_dir,
            dependency_manager,
        }
    }
}

/// Whether an adapter can build without finding its manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestPolicy {
    Required,
    /// Missing manifest is logged and the build proceeds without dependencies.
    Optional,
}

/// Build file looked up directly inside a code directory.
#[derive(Debug, Clone, Copy)]
pub struct ManifestCandidate {
    pub filename: &'static str,
    pub dependency_manager: DependencyManager,
}

#[derive(Debug, Clone)]
pub enum ManifestStrategy {
    /// The workflow does not read a manifest.
    NotApplicable,
    /// The workflow needs a structurally valid path but ignores it.
    Placeholder(PathBuf),
    /// A caller-supplied path that must be an existing regular file.
    Explicit {
        path: PathBuf,
        shown: String,
        property: &'static str,
        label: &'static str,
    },
    /// Search `start_dir` and its ancestors for `filename`.
    UpwardSearch {
        filename: String,
        start_dir: PathBuf,
        property: &'static str,
        policy: ManifestPolicy,
    },
    /// First of `candidates` present directly in `dir`, in priority order.
    FixedCandidates {
        dir: PathBuf,
        candidates: &'static [ManifestCandidate],
        property: &'static str,
    },
}

/// Resolves a strategy. `Ok(None)` means there is no manifest to pass to the builder.
pub fn resolve(
    fs: &dyn FileSystem,
    strategy: &ManifestStrategy,
) -> Result<Option<ManifestLocation>, InputErrors> {
    match strategy {
        ManifestStrategy::NotApplicable => Ok(None),
        ManifestStrategy::Placeholder(path) => {
            Ok(Some(ManifestLocation::new(path.clone(), None)))
        }
        ManifestStrategy::Explicit {
            path,
            shown,
            property,
            label,
        } => {
            if !fs.exists(path) {
                return Err(InputErrors::single(
                    *property,
                    format!("Cannot find {} at {}", label, shown),
                ));
            }
            if !fs.is_file(path) {
                return Err(InputErrors::single(
                    *property,
                    format!("{} path must be a file, got {}", label, shown),
                ));
            }
            Ok(Some(ManifestLocation::new(path.clone(), None)))
        }
        ManifestStrategy::UpwardSearch {
            filename,
            start_dir,
            property,
            policy,
        } => match find_up(fs, filename, start_dir) {
            Some(found) => {
                debug!(manifest = %found.display(), "Found manifest");
                Ok(Some(ManifestLocation::new(found, None)))
            }
            None if *policy == ManifestPolicy::Optional => {
                warn!(
                    "{} file not found. Continuing the build without dependencies.",
                    filename
                );
                Ok(None)
            }
            None => Err(InputErrors::single(
                *property,
                format!(
                    "Cannot find {} file. Please provide the path to the file",
                    filename
                ),
            )),
        },
        ManifestStrategy::FixedCandidates {
            dir,
            candidates,
            property,
        } => candidates
            .iter()
            .map(|c| (dir.join(c.filename), c.dependency_manager))
            .find(|(path, _)| fs.is_file(path))
            .map(|(path, manager)| Some(ManifestLocation::new(path, Some(manager))))
            .ok_or_else(|| {
                InputErrors::single(
                    *property,
                    format!("No {} found in code directory", candidate_list(candidates)),
                )
            }),
    }
}

fn candidate_list(candidates: &[ManifestCandidate]) -> String {
    let names: Vec<&str> = candidates.iter().map(|c| c.filename).collect();
    match names.split_last() {
        Some((last, rest)) if rest.len() > 1 => format!("{}, or {}", rest.join(", "), last),
        Some((last, rest)) if rest.len() == 1 => format!("{} or {}", rest[0], last),
        Some((last, _)) => last.to_string(),
        None => "manifest".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    const JAVA: &[ManifestCandidate] = &[
        ManifestCandidate {
            filename: "build.gradle",
            dependency_manager: DependencyManager::Gradle,
        },
        ManifestCandidate {
            filename: "build.gradle.kts",
            dependency_manager: DependencyManager::Gradle,
        },
        ManifestCandidate {
            filename: "pom.xml",
            dependency_manager: DependencyManager::Maven,
        },
    ];

    fn search(filename: &str, start: &str, policy: ManifestPolicy) -> ManifestStrategy {
        ManifestStrategy::UpwardSearch {
            filename: filename.to_string(),
            start_dir: PathBuf::from(start),
            property: "package_json_path",
            policy,
        }
    }

    #[test]
    fn test_project_dir_is_manifest_parent() {
        let location = ManifestLocation::new(PathBuf::from("/proj/package.json"), None);
        assert_eq!(location.project_dir, PathBuf::from("/proj"));
    }

    #[test]
    fn test_not_applicable() {
        let fs = MockFileSystem::new();
        assert_eq!(resolve(&fs, &ManifestStrategy::NotApplicable), Ok(None));
    }

    #[test]
    fn test_placeholder_is_not_checked() {
        let fs = MockFileSystem::new();
        let strategy = ManifestStrategy::Placeholder(PathBuf::from("/src/go.mod"));
        let location = resolve(&fs, &strategy).unwrap().unwrap();
        assert_eq!(location.manifest_path, PathBuf::from("/src/go.mod"));
    }

    #[test]
    fn test_explicit_missing_and_directory() {
        let fs = MockFileSystem::new();
        fs.add_dir("/proj/pkg");

        let missing = ManifestStrategy::Explicit {
            path: PathBuf::from("/proj/package.json"),
            shown: "package.json".to_string(),
            property: "package_json_path",
            label: "package.json",
        };
        let err = resolve(&fs, &missing).unwrap_err();
        assert_eq!(err.errors()[0].property_path, "package_json_path");
        assert_eq!(err.errors()[0].reason, "Cannot find package.json at package.json");

        let dir = ManifestStrategy::Explicit {
            path: PathBuf::from("/proj/pkg"),
            shown: "pkg".to_string(),
            property: "package_json_path",
            label: "package.json",
        };
        let err = resolve(&fs, &dir).unwrap_err();
        assert_eq!(err.errors()[0].reason, "package.json path must be a file, got pkg");
    }

    #[test]
    fn test_required_search_not_found() {
        let fs = MockFileSystem::new();
        fs.add_dir("/fake_dir");

        let err = resolve(&fs, &search("package.json", "/fake_dir", ManifestPolicy::Required))
            .unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(
            err.errors()[0].reason,
            "Cannot find package.json file. Please provide the path to the file"
        );
    }

    #[test]
    fn test_optional_search_not_found() {
        let fs = MockFileSystem::new();
        fs.add_dir("/proj/app");

        let result = resolve(
            &fs,
            &search("requirements.txt", "/proj/app", ManifestPolicy::Optional),
        );
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_fixed_candidates_priority() {
        let fs = MockFileSystem::new();
        fs.add_file("/code/pom.xml");
        fs.add_file("/code/build.gradle");

        let strategy = ManifestStrategy::FixedCandidates {
            dir: PathBuf::from("/code"),
            candidates: JAVA,
            property: "code",
        };
        let location = resolve(&fs, &strategy).unwrap().unwrap();
        assert_eq!(location.manifest_path, PathBuf::from("/code/build.gradle"));
        assert_eq!(location.dependency_manager, Some(DependencyManager::Gradle));
    }

    #[test]
    fn test_fixed_candidates_do_not_search_upward() {
        let fs = MockFileSystem::new();
        fs.add_file("/pom.xml");
        fs.add_dir("/code");

        let strategy = ManifestStrategy::FixedCandidates {
            dir: PathBuf::from("/code"),
            candidates: JAVA,
            property: "code",
        };
        let err = resolve(&fs, &strategy).unwrap_err();
        assert_eq!(
            err.errors()[0].reason,
            "No build.gradle, build.gradle.kts, or pom.xml found in code directory"
        );
    }
}
