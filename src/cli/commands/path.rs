//! CLI implementation for `pinsync path`

use std::path::Path;

use anyhow::Result;

use crate::core::build_env::search_path;

/// Print the build tool search path for the enclosing project
pub fn execute(start: &Path) -> Result<()> {
    let (project, config) = super::open_project(start)?;
    let path = search_path(&project, &config)?;
    println!("{}", path.to_string_lossy());
    Ok(())
}
