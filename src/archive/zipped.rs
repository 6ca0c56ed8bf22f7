use super::{ArchiveHandle, ArchiveKind, Archiver};
use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes `<artifacts>.zip` next to the artifacts directory.
///
/// Entries are added in sorted order so two builds of the same tree hash the same,
/// modulo timestamps written by the zip encoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn archive_path(directory: &Path) -> PathBuf {
        let mut name = directory.as_os_str().to_owned();
        name.push(".zip");
        PathBuf::from(name)
    }
}

impl Archiver for ZipArchiver {
    fn kind(&self) -> ArchiveKind {
        ArchiveKind::Zip
    }

    fn archive(&self, directory: &Path) -> Result<ArchiveHandle> {
        if !directory.is_dir() {
            bail!("Artifacts directory {} does not exist", directory.display());
        }

        let target = Self::archive_path(directory);
        let entries = collect_entries(directory);
        debug!(entries = entries.len(), target = %target.display(), "Writing zip archive");

        let file = File::create(&target)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));

        for entry in &entries {
            let relative = entry.strip_prefix(directory).unwrap_or(entry);
            let name = entry_name(relative);
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(permissions(entry));

            if entry.is_dir() {
                writer
                    .add_directory(name, options)
                    .with_context(|| format!("Failed to add directory {}", entry.display()))?;
            } else {
                writer
                    .start_file(name, options)
                    .with_context(|| format!("Failed to add file {}", entry.display()))?;
                let mut source = BufReader::new(
                    File::open(entry)
                        .with_context(|| format!("Failed to open {}", entry.display()))?,
                );
                io::copy(&mut source, &mut writer)
                    .with_context(|| format!("Failed to compress {}", entry.display()))?;
            }
        }

        writer.finish().context("Failed to finalize zip archive")?;

        let (size, sha256) = digest(&target)?;
        info!(path = %target.display(), size, sha256 = %sha256, "Created zip archive");

        Ok(ArchiveHandle {
            kind: ArchiveKind::Zip,
            path: target,
            size: Some(size),
            sha256: Some(sha256),
        })
    }
}

fn collect_entries(directory: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = ignore::WalkBuilder::new(directory)
        .standard_filters(false)
        .hidden(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry.into_path()),
            Err(err) => {
                warn!("Failed to read artifacts entry: {}", err);
                None
            }
        })
        .filter(|p| p != directory)
        .collect();
    entries.sort();
    entries
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn permissions(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn permissions(path: &Path) -> u32 {
    if path.is_dir() {
        0o755
    } else {
        0o644
    }
}

fn digest(path: &Path) -> Result<(u64, String)> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let size = io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to hash {}", path.display()))?;
    Ok((size, hex::encode(hasher.finalize())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn populate(root: &Path) -> PathBuf {
        let artifacts = root.join("lambda-artifacts-abc");
        std::fs::create_dir_all(artifacts.join("lib")).unwrap();
        std::fs::write(artifacts.join("bootstrap"), "#!/bin/sh\necho hi\n").unwrap();
        std::fs::write(artifacts.join("lib/util.js"), "module.exports = {}").unwrap();
        std::fs::write(artifacts.join(".env"), "A=1").unwrap();
        artifacts
    }

    #[test]
    fn test_archive_path_keeps_dots() {
        assert_eq!(
            ZipArchiver::archive_path(Path::new("/tmp/build.v1")),
            PathBuf::from("/tmp/build.v1.zip")
        );
    }

    #[test]
    fn test_zip_contains_every_entry() {
        let temp = TempDir::new().unwrap();
        let artifacts = populate(temp.path());

        let handle = ZipArchiver.archive(&artifacts).unwrap();
        assert_eq!(handle.kind, ArchiveKind::Zip);
        assert_eq!(handle.path, temp.path().join("lambda-artifacts-abc.zip"));
        assert_eq!(handle.size, Some(std::fs::metadata(&handle.path).unwrap().len()));
        assert_eq!(handle.sha256.as_ref().map(String::len), Some(64));

        let mut archive = zip::ZipArchive::new(File::open(&handle.path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec![".env", "bootstrap", "lib/", "lib/util.js"]);

        let mut content = String::new();
        archive
            .by_name("lib/util.js")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "module.exports = {}");
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_keeps_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let artifacts = populate(temp.path());
        let bootstrap = artifacts.join("bootstrap");
        std::fs::set_permissions(&bootstrap, std::fs::Permissions::from_mode(0o755)).unwrap();

        let handle = ZipArchiver.archive(&artifacts).unwrap();
        let mut archive = zip::ZipArchive::new(File::open(&handle.path).unwrap()).unwrap();
        let mode = archive.by_name("bootstrap").unwrap().unix_mode().unwrap();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        assert!(ZipArchiver.archive(&temp.path().join("missing")).is_err());
    }
}
