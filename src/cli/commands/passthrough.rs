//! Build tool passthrough
//!
//! Any command pinsync does not handle itself goes to the build tool, but
//! only after the cache has been verified against the pin file.

use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::build_env::{check_command, BuildEnvironment};
use crate::core::verify::VerifyEngine;
use crate::infra::locator::HostLocator;
use crate::infra::vcs::VcsBackends;

/// Verify, then hand `args` to the build tool
pub fn execute(start: &Path, args: &[OsString]) -> Result<()> {
    let (project, config) = super::open_project(start)?;
    check_command(&config, args)?;

    let locator = HostLocator::new(&config.repos)?;
    let vcs = VcsBackends::from_path();
    let (_, outcome) = VerifyEngine::new(&project, &locator, &vcs).verify()?;
    super::verify::report(&outcome);

    let env = BuildEnvironment::for_project(&project, &config)?;
    tracing::info!(
        "Running {} with {}={}",
        env.tool.display(),
        env.path_var,
        env.search_path.to_string_lossy()
    );
    run(&env, args, start)
}

#[cfg(unix)]
fn run(env: &BuildEnvironment, args: &[OsString], dir: &Path) -> Result<()> {
    use std::os::unix::process::CommandExt;

    // exec only returns on failure
    let error = env.command(args, dir).exec();
    Err(error).with_context(|| format!("Failed to execute {}", env.tool.display()))
}

#[cfg(not(unix))]
fn run(env: &BuildEnvironment, args: &[OsString], dir: &Path) -> Result<()> {
    let status = env
        .command(args, dir)
        .status()
        .with_context(|| format!("Failed to execute {}", env.tool.display()))?;
    std::process::exit(status.code().unwrap_or(1));
}
