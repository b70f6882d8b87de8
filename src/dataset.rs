//! Dataset entries: files whose names encode an integer identifier
//!
//! A dataset is a plain directory of files named `<prefix><integer><ext>`.
//! Names are parsed once per scan into [`DatasetEntry`] records.

use crate::error::{DatasetError, Result};
use std::path::{Path, PathBuf};

/// Extract the identifier encoded after `prefix` in a file name
///
/// The stem (file name without its final extension) must start with `prefix`
/// and the remainder must be a signed integer. Zero and negative values are
/// returned unchanged; range membership is decided by the caller.
///
/// # Examples
/// ```rust
/// use imgset::dataset::extract_identifier;
///
/// assert_eq!(extract_identifier("sample_15.jpg", "sample_"), Some(15));
/// assert_eq!(extract_identifier("sample_final.jpg", "sample_"), None);
/// assert_eq!(extract_identifier("photo_3.jpg", "sample_"), None);
/// ```
#[must_use]
pub fn extract_identifier(file_name: &str, prefix: &str) -> Option<i64> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    stem.strip_prefix(prefix)?.parse::<i64>().ok()
}

/// A file in the dataset directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    /// Full path to the file
    pub path: PathBuf,
    /// File name component
    pub file_name: String,
    /// Parsed identifier, `None` when the name does not encode one
    pub identifier: Option<i64>,
    /// Size on disk in bytes
    pub byte_size: u64,
    /// Extension including the leading dot, empty if absent
    pub extension: String,
}

impl DatasetEntry {
    /// Build an entry from a path on disk
    pub fn from_path<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = std::fs::metadata(path)
            .map_err(|e| DatasetError::file_io_error("read metadata of", path, &e))?;

        Ok(Self {
            identifier: extract_identifier(&file_name, prefix),
            extension: path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default(),
            byte_size: metadata.len(),
            path: path.to_path_buf(),
            file_name,
        })
    }
}

/// Enumerate the entries of `dir` matching `<prefix>*<extension>`
///
/// The scan is non-recursive, only regular files are returned, and the
/// result is sorted by file name.
pub fn scan_dataset<P: AsRef<Path>>(
    dir: P,
    prefix: &str,
    extension: &str,
) -> Result<Vec<DatasetEntry>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DatasetError::missing_directory(dir));
    }

    let pattern = glob::Pattern::new(&format!(
        "{}*{}",
        glob::Pattern::escape(prefix),
        glob::Pattern::escape(extension)
    ))
    .map_err(|e| DatasetError::invalid_config(format!("invalid file pattern: {e}")))?;

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)
        .map_err(|e| DatasetError::file_io_error("read directory", dir, &e))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().is_some_and(|name| pattern.matches(name)) {
            entries.push(DatasetEntry::from_path(entry.path(), prefix)?);
        }
    }

    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    tracing::debug!(
        dir = %dir.display(),
        matched = entries.len(),
        "Scanned dataset directory"
    );
    Ok(entries)
}
