//! Reusable input checks shared by the adapters.

use super::PropertyError;
use crate::fs::FileSystem;
use crate::runtimes::Architecture;
use std::path::Path;

/// Joins choices as `'a', 'b' or 'c'`.
fn quoted_choices(choices: &[&str]) -> String {
    let quoted: Vec<String> = choices.iter().map(|c| format!("'{}'", c)).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

pub fn runtime(value: &str, supported: &[&str]) -> Result<(), PropertyError> {
    if supported.contains(&value) {
        Ok(())
    } else {
        Err(PropertyError::new(
            "runtime",
            format!("Runtime must be one of {}", supported.join(", ")),
        ))
    }
}

pub fn architecture(value: Option<&str>) -> Result<Architecture, PropertyError> {
    Architecture::resolve(value).map_err(|_| {
        let valid: Vec<&str> = Architecture::ALL.iter().map(|a| a.as_str()).collect();
        PropertyError::new(
            "architecture",
            format!("Architecture must be one of {}", valid.join(", ")),
        )
    })
}

/// `value` must be one of `allowed`; `label` starts the reason ("Bundler must be ...").
pub fn one_of(
    property: &str,
    label: &str,
    value: &str,
    allowed: &[&str],
) -> Result<(), PropertyError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(PropertyError::new(
            property,
            format!("{} must be one of {}", label, quoted_choices(allowed)),
        ))
    }
}

pub fn non_empty(property: &str, label: &str, value: &str) -> Result<(), PropertyError> {
    if value.trim().is_empty() {
        Err(PropertyError::new(property, format!("{} must not be empty", label)))
    } else {
        Ok(())
    }
}

/// The entry path has one of `extensions` (given without the dot).
pub fn entry_extension(value: &str, extensions: &[&str]) -> Result<(), PropertyError> {
    let matches = Path::new(value)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext))
        .unwrap_or(false);

    if matches {
        Ok(())
    } else {
        Err(PropertyError::new(
            "entry",
            "Entry file must be a JavaScript or TypeScript file",
        ))
    }
}

/// The entry file exists; `path` is the absolute form, `shown` what the caller passed.
pub fn entry_exists(fs: &dyn FileSystem, path: &Path, shown: &str) -> Result<(), PropertyError> {
    if fs.exists(path) {
        Ok(())
    } else {
        Err(PropertyError::new(
            "entry",
            format!("Cannot find entry file at {}", shown),
        ))
    }
}

/// An explicitly supplied manifest override references an existing regular file.
pub fn manifest_file(
    fs: &dyn FileSystem,
    property: &str,
    label: &str,
    path: &Path,
    shown: &str,
) -> Result<(), PropertyError> {
    if fs.is_file(path) {
        Ok(())
    } else {
        Err(PropertyError::new(
            property,
            format!("{} not found at path provided: {}", label, shown),
        ))
    }
}

/// The code path exists and, unless `allow_file`, is a directory.
pub fn code_path(
    fs: &dyn FileSystem,
    path: &Path,
    shown: &str,
    allow_file: bool,
) -> Result<(), PropertyError> {
    if !fs.exists(path) {
        return Err(PropertyError::new(
            "code",
            format!("Cannot find code path at {}", shown),
        ));
    }
    if !allow_file && !fs.is_dir(path) {
        return Err(PropertyError::new(
            "code",
            format!("Code path must be a directory, got {}", shown),
        ));
    }
    Ok(())
}
