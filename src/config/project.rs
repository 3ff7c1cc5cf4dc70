//! Project configuration
//!
//! Reads optional settings from `pinsync/config.toml`: the wrapped build
//! tool and repository overrides for import paths the locator cannot
//! resolve on its own.
//!
//! ```toml
//! [build]
//! tool = "go"
//! path_var = "GOPATH"
//! disabled = ["install", "get"]
//!
//! [[repo]]
//! prefix = "example.com/team/lib"
//! vcs = "git"
//! remote = "ssh://git@example.com/team/lib.git"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::defaults;
use crate::error::ConfigError;

/// Per-project configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    /// Build tool settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Repository overrides
    #[serde(default, rename = "repo")]
    pub repos: Vec<RepoOverride>,
}

/// Build tool settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    /// Build tool executable
    pub tool: Option<String>,

    /// Search path variable handed to the build tool
    pub path_var: Option<String>,

    /// Subcommands rejected on the passthrough path
    pub disabled: Option<Vec<String>>,
}

/// Explicit repository for an import prefix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoOverride {
    /// Import path prefix; also the repository root identifier
    pub prefix: String,

    /// VCS kind (`git`, `hg`, `svn`, `bzr`)
    pub vcs: String,

    /// Clone address
    pub remote: String,
}

impl ProjectConfig {
    /// Load configuration from a specific path
    ///
    /// If the file doesn't exist, returns the default configuration.
    /// If it exists but is invalid, returns an error.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective build tool
    ///
    /// `PINSYNC_BUILD_TOOL` wins over the config file.
    #[must_use]
    pub fn build_tool(&self) -> String {
        if let Ok(tool) = std::env::var(defaults::ENV_BUILD_TOOL) {
            if !tool.is_empty() {
                return tool;
            }
        }
        self.build
            .tool
            .clone()
            .unwrap_or_else(|| defaults::BUILD_TOOL.to_string())
    }

    /// Effective search path variable
    #[must_use]
    pub fn search_path_var(&self) -> &str {
        self.build
            .path_var
            .as_deref()
            .unwrap_or(defaults::SEARCH_PATH_VAR)
    }

    /// Whether `command` is rejected on the passthrough path
    #[must_use]
    pub fn is_disabled_command(&self, command: &str) -> bool {
        match &self.build.disabled {
            Some(list) => list.iter().any(|c| c == command),
            None => defaults::DISABLED_COMMANDS.contains(&command),
        }
    }
}
