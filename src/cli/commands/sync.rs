//! CLI implementation for `pinsync sync`

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{create_spinner, print_detail, print_success};
use crate::core::sync::SyncEngine;
use crate::infra::inspector::GoSourceInspector;
use crate::infra::locator::HostLocator;
use crate::infra::vcs::VcsBackends;

/// Execute the sync command
pub fn execute(start: &Path) -> Result<()> {
    let (project, config) = super::open_project(start)?;
    let locator = HostLocator::new(&config.repos)?;
    let inspector = GoSourceInspector::new();
    let vcs = VcsBackends::from_path();

    let spinner = create_spinner("Resolving dependencies...");
    let on_clone = |root: &str| spinner.set_message(format!("Cloning {root}..."));
    let result = SyncEngine::new(&project, &locator, &inspector, &vcs)
        .on_clone(&on_clone)
        .sync();
    spinner.finish_and_clear();
    let outcome = result?;

    for root in &outcome.cloned {
        print_detail(&format!("Cloned {root}"));
    }
    for (root, rev) in &outcome.updated {
        print_detail(&format!("Updated {root} to {rev}"));
    }
    print_success(&format!(
        "Pinned {} dependencies in {}",
        outcome.pinlist.len(),
        project.pinlist_path().display()
    ));

    Ok(())
}
