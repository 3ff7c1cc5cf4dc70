//! Build tool environment
//!
//! Everything the passthrough path needs to hand control to the wrapped
//! build tool: the located executable and the process environment with
//! the library search path pointed at the project and its cache.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::project::ProjectConfig;
use crate::core::project::Project;
use crate::error::PinsyncError;

/// Reject build tool subcommands that would bypass pinning
///
/// Only the first argument is the subcommand; later arguments are passed
/// through untouched.
pub fn check_command(config: &ProjectConfig, args: &[OsString]) -> Result<(), PinsyncError> {
    let Some(command) = args.first().and_then(|a| a.to_str()) else {
        return Ok(());
    };
    if config.is_disabled_command(command) {
        return Err(PinsyncError::DisabledCommand {
            tool: config.build_tool(),
            command: command.to_string(),
        });
    }
    Ok(())
}

/// Environment for running the build tool inside a project
#[derive(Debug, Clone, PartialEq)]
pub struct BuildEnvironment {
    /// Located build tool executable
    pub tool: PathBuf,
    /// Search path variable (e.g. `GOPATH`)
    pub path_var: String,
    /// Search path value: project root, then cache root
    pub search_path: OsString,
}

impl BuildEnvironment {
    pub fn new(tool: PathBuf, path_var: impl Into<String>, search_path: OsString) -> Self {
        Self {
            tool,
            path_var: path_var.into(),
            search_path,
        }
    }

    /// Locate the configured build tool and compute the project search path
    pub fn for_project(project: &Project, config: &ProjectConfig) -> Result<Self, PinsyncError> {
        let name = config.build_tool();
        let tool = which::which(&name)
            .map_err(|_| PinsyncError::BuildToolNotFound { tool: name.clone() })?;
        tracing::debug!("Build tool: {}", tool.display());
        Ok(Self::new(
            tool,
            config.search_path_var(),
            search_path(project, config)?,
        ))
    }

    /// Current process environment with the search path variable replaced
    pub fn to_env_map(&self) -> HashMap<OsString, OsString> {
        self.env_from(std::env::vars_os())
    }

    fn env_from(
        &self,
        base: impl IntoIterator<Item = (OsString, OsString)>,
    ) -> HashMap<OsString, OsString> {
        let mut env: HashMap<OsString, OsString> = base.into_iter().collect();
        env.insert(OsString::from(&self.path_var), self.search_path.clone());
        env
    }

    /// Command running the build tool with `args` in `dir`
    pub fn command<I, S>(&self, args: I, dir: &Path) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.tool);
        cmd.args(args)
            .current_dir(dir)
            .env_clear()
            .envs(self.to_env_map());
        cmd
    }
}

/// Search path printed by `pinsync path`
pub fn search_path(project: &Project, config: &ProjectConfig) -> Result<OsString, PinsyncError> {
    project
        .search_path()
        .map_err(|e| PinsyncError::InvalidSearchPath {
            var: config.search_path_var().to_string(),
            error: e.to_string(),
        })
}
