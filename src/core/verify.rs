//! Cache verification
//!
//! Checks that every pinned dependency is cached at exactly its pinned
//! revision and deletes cached repositories the pin set no longer
//! references. Never clones, fetches or checks out.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::core::pinlist::Pinlist;
use crate::core::project::Project;
use crate::error::PinsyncError;
use crate::infra::locator::RepoLocator;
use crate::infra::vcs::VcsProvider;

/// Result of a verification run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct VerifyOutcome {
    /// Roots at the right revision but with local modifications
    pub dirty: Vec<String>,
    /// Cache entries deleted because nothing pins them
    pub pruned: Vec<String>,
}

/// Verifies a project's cache against a pin set
pub struct VerifyEngine<'a> {
    project: &'a Project,
    locator: &'a dyn RepoLocator,
    vcs: &'a dyn VcsProvider,
}

impl<'a> VerifyEngine<'a> {
    pub fn new(
        project: &'a Project,
        locator: &'a dyn RepoLocator,
        vcs: &'a dyn VcsProvider,
    ) -> Self {
        Self {
            project,
            locator,
            vcs,
        }
    }

    /// Verify against the project's pin file, then rewrite it normalized
    ///
    /// An absent pin file verifies as an empty set, which prunes the whole
    /// cache.
    pub fn verify(&self) -> Result<(Pinlist, VerifyOutcome), PinsyncError> {
        let path = self.project.pinlist_path();
        let mut pinlist = match Pinlist::load(&path)? {
            Some(pinlist) => pinlist,
            None => {
                warn!(
                    "No pin file at {}; treating as empty. Try running 'pinsync sync'",
                    path.display()
                );
                Pinlist::new()
            }
        };
        let outcome = self.run(&pinlist)?;
        pinlist.save(&path)?;
        Ok((pinlist, outcome))
    }

    /// Check the cache against `pinlist` and prune unreferenced entries
    pub fn run(&self, pinlist: &Pinlist) -> Result<VerifyOutcome, PinsyncError> {
        let cache = self.project.cache();
        let mut outcome = VerifyOutcome::default();
        let mut referenced = BTreeSet::new();

        for dep in &pinlist.deps {
            let repo = self.locator.resolve(&dep.name)?;
            if !cache.exists(&repo.root) {
                return Err(PinsyncError::NotCached {
                    identifier: dep.name.clone(),
                    root: repo.root,
                });
            }

            if referenced.insert(repo.root.clone()) {
                debug!("Verifying {} at {}", repo.root, dep.rev);
            }
            let vcs = self.vcs.backend(repo.vcs, &repo.root)?;
            let state = vcs.inspect(&cache.path_for(&repo.root))?;
            if state.revision != dep.rev {
                return Err(PinsyncError::RevisionMismatch {
                    identifier: dep.name.clone(),
                    root: repo.root,
                    expected: dep.rev.clone(),
                    found: state.revision,
                });
            }
            if state.dirty && !outcome.dirty.contains(&repo.root) {
                warn!("Cached repository {} has local changes", repo.root);
                outcome.dirty.push(repo.root);
            }
        }

        for cached in cache.cached_repositories()? {
            let repo = self.locator.resolve(&cached)?;
            if referenced.contains(&repo.root) {
                continue;
            }
            info!("Removing unreferenced {cached}");
            cache.remove(&cached)?;
            outcome.pruned.push(cached);
        }

        // Go code without VCS metadata would still be on the search path
        for loose in cache.loose_packages()? {
            if !cache.exists(&loose) {
                continue;
            }
            let repo = self.locator.resolve(&loose)?;
            if referenced.contains(&repo.root) {
                continue;
            }
            info!("Removing undeclared package {loose}");
            cache.remove(&loose)?;
            outcome.pruned.push(loose);
        }

        Ok(outcome)
    }
}
