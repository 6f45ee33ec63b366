use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::AppConfig;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// Expand file and directory arguments into the media files to rename.
///
/// Files are kept in argument order. Each directory contributes its
/// visible, accepted files sorted by name; subdirectories are not entered.
pub fn collect_files(paths: &[PathBuf], config: &AppConfig) -> Result<Vec<PathBuf>, ScannerError> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(ScannerError::PathNotFound(path.clone()));
        }

        if path.is_dir() {
            files.extend(scan_directory(path, config)?);
        } else if config.is_accepted(path) {
            debug!(path = ?path, "Adding file");
            files.push(path.clone());
        } else {
            warn!(path = ?path, "Skipping file with unsupported extension");
        }
    }

    debug!(count = files.len(), "Collected files");
    Ok(files)
}

fn scan_directory(target: &Path, config: &AppConfig) -> Result<Vec<PathBuf>, ScannerError> {
    debug!(path = ?target, "Scanning directory");

    let read_dir = fs::read_dir(target).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ScannerError::PermissionDenied(target.to_path_buf())
        } else {
            ScannerError::IoError(e)
        }
    })?;

    let mut entries = Vec::new();

    for entry in read_dir {
        let entry = entry?;
        let path = entry.path();

        trace!(entry = ?path, "Examining entry");

        if !path.is_file() {
            trace!(path = ?path, "Skipping non-file");
            continue;
        }

        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().to_string(),
            None => continue,
        };

        if name.starts_with('.') {
            trace!(name = %name, "Skipping hidden file");
            continue;
        }

        if !config.is_accepted(&path) {
            trace!(name = %name, "Skipping unsupported extension");
            continue;
        }

        entries.push((name, path));
    }

    entries.sort_by(|a, b| a.0.cmp(&b.0));

    debug!(count = entries.len(), "Scan complete");

    Ok(entries.into_iter().map(|(_, path)| path).collect())
}
