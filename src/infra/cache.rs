//! Dependency cache layout
//!
//! One VCS working directory per repository root under
//! `<project>/pinsync/_cache/src/<root>`. This type is the only place that
//! knows the layout; both engines go through it.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::defaults::CACHE_SRC_DIR_NAME;
use crate::error::FilesystemError;
use crate::infra::filesystem;
use crate::infra::inspector::is_go_file;
use crate::infra::vcs::VcsKind;

/// On-disk dependency cache
#[derive(Debug, Clone)]
pub struct DependencyCache {
    /// `<cacheRoot>/src`
    src_dir: PathBuf,
}

impl DependencyCache {
    /// Cache rooted at `cache_root` (the `_cache` directory)
    pub fn new(cache_root: &Path) -> Self {
        Self {
            src_dir: cache_root.join(CACHE_SRC_DIR_NAME),
        }
    }

    /// Working directory for a repository root (or a package inside one)
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        identifier
            .split('/')
            .fold(self.src_dir.clone(), |path, segment| path.join(segment))
    }

    pub fn exists(&self, root: &str) -> bool {
        self.path_for(root).is_dir()
    }

    /// Delete a cached repository and any parents left empty
    pub fn remove(&self, root: &str) -> Result<(), FilesystemError> {
        let path = self.path_for(root);
        filesystem::remove_dir_all(&path)?;
        if let Some(parent) = path.parent() {
            filesystem::remove_empty_parents(parent, &self.src_dir)?;
        }
        Ok(())
    }

    /// Relative paths of every checkout present in the cache
    ///
    /// A directory counts as a checkout when it holds VCS metadata; the
    /// walk does not descend into a checkout once found. Paths use `/`
    /// separators and come back sorted.
    pub fn cached_repositories(&self) -> Result<Vec<String>, FilesystemError> {
        let mut repos = Vec::new();
        if !self.src_dir.is_dir() {
            return Ok(repos);
        }

        let mut walker = WalkDir::new(&self.src_dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| FilesystemError::Walk {
                path: self.src_dir.clone(),
                error: e.to_string(),
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if is_metadata_dir(entry.file_name()) {
                walker.skip_current_dir();
                continue;
            }
            if is_checkout(entry.path()) {
                if let Some(rel) = self.relative_identifier(entry.path()) {
                    repos.push(rel);
                }
                walker.skip_current_dir();
            }
        }

        repos.sort();
        Ok(repos)
    }

    /// Relative paths of directories holding Go files outside any checkout
    ///
    /// These have no VCS metadata, so nothing else would ever resolve or
    /// remove them. Parents come before their subdirectories.
    pub fn loose_packages(&self) -> Result<Vec<String>, FilesystemError> {
        let mut packages = Vec::new();
        if !self.src_dir.is_dir() {
            return Ok(packages);
        }

        let mut walker = WalkDir::new(&self.src_dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| FilesystemError::Walk {
                path: self.src_dir.clone(),
                error: e.to_string(),
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if is_metadata_dir(entry.file_name()) || is_checkout(entry.path()) {
                walker.skip_current_dir();
                continue;
            }
            if has_go_files(entry.path()) {
                if let Some(rel) = self.relative_identifier(entry.path()) {
                    packages.push(rel);
                }
            }
        }

        Ok(packages)
    }

    fn relative_identifier(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.src_dir).ok()?;
        let parts: Vec<_> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

const VCS_KINDS: [VcsKind; 4] = [
    VcsKind::Git,
    VcsKind::Mercurial,
    VcsKind::Subversion,
    VcsKind::Bazaar,
];

fn is_metadata_dir(name: &std::ffi::OsStr) -> bool {
    VCS_KINDS.iter().any(|k| name == k.metadata_dir())
}

fn is_checkout(path: &Path) -> bool {
    VCS_KINDS.iter().any(|k| path.join(k.metadata_dir()).exists())
}

fn has_go_files(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(Result::ok)
            .any(|e| is_go_file(&e.path()))
    })
}
