//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod passthrough;
pub mod path;
pub mod sync;
pub mod verify;

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::project::ProjectConfig;
use crate::core::project::Project;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every imported dependency and pin it in pinsync/deps.json
    Sync,

    /// Check the cache against the pin file and remove unpinned repositories
    Verify,

    /// Print the GOPATH used for the build tool
    Path,

    /// Any other command is verified, then run by the build tool
    #[command(external_subcommand)]
    External(Vec<OsString>),
}

impl Commands {
    /// Execute the command
    pub fn run(self) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Sync => sync::execute(&current_dir),
            Self::Verify => verify::execute(&current_dir),
            Self::Path => path::execute(&current_dir),
            Self::External(args) => passthrough::execute(&current_dir, &args),
        }
    }
}

/// Find the enclosing project and load its configuration
pub(crate) fn open_project(start: &Path) -> Result<(Project, ProjectConfig)> {
    let project = Project::discover(start)?;
    let config_path = project.config_path();
    let config = ProjectConfig::load_from_path(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    Ok((project, config))
}
