//! CLI implementation for `pinsync verify`

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{print_detail, print_success, print_warning};
use crate::core::verify::{VerifyEngine, VerifyOutcome};
use crate::infra::locator::HostLocator;
use crate::infra::vcs::VcsBackends;

/// Execute the verify command
pub fn execute(start: &Path) -> Result<()> {
    let (project, config) = super::open_project(start)?;
    let locator = HostLocator::new(&config.repos)?;
    let vcs = VcsBackends::from_path();

    let (pinlist, outcome) = VerifyEngine::new(&project, &locator, &vcs).verify()?;
    report(&outcome);
    print_success(&format!("{} pinned dependencies verified", pinlist.len()));

    Ok(())
}

/// Print dirty warnings and pruned entries
pub(crate) fn report(outcome: &VerifyOutcome) {
    for root in &outcome.dirty {
        print_warning(&format!("{root} has uncommitted changes"));
    }
    for root in &outcome.pruned {
        print_detail(&format!("Removed unpinned {root}"));
    }
}
