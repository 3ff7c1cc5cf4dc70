//! Filesystem operations
//!
//! Handles file and directory operations.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Remove empty directories from `start` upward, stopping at `stop`
///
/// `stop` itself is never removed.
pub fn remove_empty_parents(start: &Path, stop: &Path) -> Result<(), FilesystemError> {
    let mut current = start.to_path_buf();
    while current.starts_with(stop) && current != stop {
        match std::fs::remove_dir(&current) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            // Not empty: everything above is non-empty too.
            Err(_) if is_non_empty_dir(&current) => break,
            Err(e) => {
                return Err(FilesystemError::RemoveDir {
                    path: current,
                    error: e.to_string(),
                })
            }
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    Ok(())
}

fn is_non_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Write content to a temporary sibling, then rename it over `path`
///
/// The previous file is left intact if the write fails.
pub fn write_file_atomic(path: &Path, content: &[u8]) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let tmp = temp_sibling(path);
    if let Err(e) = std::fs::write(&tmp, content) {
        let _ = std::fs::remove_file(&tmp);
        return Err(FilesystemError::WriteFile {
            path: tmp,
            error: e.to_string(),
        });
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        FilesystemError::Rename {
            from: tmp.clone(),
            to: path.to_path_buf(),
            error: e.to_string(),
        }
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read content from a file, returning `None` if it does not exist
pub fn read_file_if_exists(path: &Path) -> Result<Option<String>, FilesystemError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FilesystemError::ReadFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        }),
    }
}
