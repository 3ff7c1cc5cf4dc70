//! Project layout
//!
//! A pinsync project is any directory containing a `pinsync/` directory.
//! Every path the engines touch is derived from the project root held
//! here; nothing depends on the process working directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::defaults::{
    CACHE_DIR_NAME, CONFIG_NAME, PINLIST_NAME, PROJECT_DIR_NAME, SOURCE_DIR_NAME,
};
use crate::error::PinsyncError;
use crate::infra::cache::DependencyCache;

/// Paths of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Project rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk up from `start` to the nearest directory containing `pinsync/`
    pub fn discover(start: &Path) -> Result<Self, PinsyncError> {
        let start = if start.is_absolute() {
            start.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(start))
                .unwrap_or_else(|_| start.to_path_buf())
        };

        for dir in start.ancestors() {
            if dir.join(PROJECT_DIR_NAME).is_dir() {
                tracing::debug!("Project root: {}", dir.display());
                return Ok(Self::new(dir));
            }
        }
        Err(PinsyncError::ProjectNotFound { start })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/pinsync`
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR_NAME)
    }

    /// `<root>/pinsync/deps.json`
    pub fn pinlist_path(&self) -> PathBuf {
        self.project_dir().join(PINLIST_NAME)
    }

    /// `<root>/pinsync/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.project_dir().join(CONFIG_NAME)
    }

    /// `<root>/pinsync/_cache`
    pub fn cache_root(&self) -> PathBuf {
        self.project_dir().join(CACHE_DIR_NAME)
    }

    /// `<root>/src`
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(SOURCE_DIR_NAME)
    }

    /// Cache facade for this project
    pub fn cache(&self) -> DependencyCache {
        DependencyCache::new(&self.cache_root())
    }

    /// Library search path handed to the build tool: project root, then cache
    pub fn search_path(&self) -> Result<OsString, std::env::JoinPathsError> {
        std::env::join_paths([self.root.clone(), self.cache_root()])
    }
}
