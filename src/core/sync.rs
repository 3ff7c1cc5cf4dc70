//! Dependency synchronization
//!
//! Walks the import graph from the project's own packages, makes sure every
//! reachable repository is cached at its pinned revision (cloning or
//! checking out as needed), adopts the on-disk revision for anything not
//! yet pinned, and produces the new pin set.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::core::pinlist::Pinlist;
use crate::core::project::Project;
use crate::core::sorted_set::SortedSet;
use crate::error::{InspectError, PinsyncError};
use crate::infra::inspector::{project_imports, SourceInspector};
use crate::infra::locator::RepoLocator;
use crate::infra::vcs::VcsProvider;

/// Result of a sync run
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// New pin set covering exactly the reachable dependencies
    pub pinlist: Pinlist,
    /// The project's own package identifiers
    pub project_packages: SortedSet,
    /// Repository roots cloned during this run
    pub cloned: Vec<String>,
    /// Repository roots moved to a different revision, with that revision
    pub updated: Vec<(String, String)>,
}

/// Drives one sync of a project
pub struct SyncEngine<'a> {
    project: &'a Project,
    locator: &'a dyn RepoLocator,
    inspector: &'a dyn SourceInspector,
    vcs: &'a dyn VcsProvider,
    on_clone: Option<&'a dyn Fn(&str)>,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        project: &'a Project,
        locator: &'a dyn RepoLocator,
        inspector: &'a dyn SourceInspector,
        vcs: &'a dyn VcsProvider,
    ) -> Self {
        Self {
            project,
            locator,
            inspector,
            vcs,
            on_clone: None,
        }
    }

    /// Call `hook` with the repository root before each clone
    #[must_use]
    pub fn on_clone(mut self, hook: &'a dyn Fn(&str)) -> Self {
        self.on_clone = Some(hook);
        self
    }

    /// Load the project's pin file, sync against it and save the result
    pub fn sync(&self) -> Result<SyncOutcome, PinsyncError> {
        let path = self.project.pinlist_path();
        let previous = Pinlist::load_or_default(&path)?;
        let mut outcome = self.run(&previous)?;
        outcome.pinlist.save(&path)?;
        info!("Wrote {} pins to {}", outcome.pinlist.len(), path.display());
        Ok(outcome)
    }

    /// Sync the cache against `previous` and return the new pin set
    ///
    /// Nothing is written to the pin file; the cache is modified.
    pub fn run(&self, previous: &Pinlist) -> Result<SyncOutcome, PinsyncError> {
        let previous = previous.as_map();
        let cache = self.project.cache();

        let discovered = project_imports(
            self.inspector,
            self.project.root(),
            &self.project.source_dir(),
        )?;
        info!(
            "Found {} project packages importing {} dependencies",
            discovered.packages.len(),
            discovered.imports.len()
        );

        let mut outcome = SyncOutcome {
            project_packages: discovered.packages.clone(),
            ..SyncOutcome::default()
        };
        let mut queue = discovered.imports;
        let mut processed = SortedSet::new();
        let mut root_of: HashMap<String, String> = HashMap::new();
        let mut rev_of_root: HashMap<String, String> = HashMap::new();

        while let Some(import) = queue.pop_first() {
            debug!("Processing {import}");
            let repo = self.locator.resolve(&import)?;
            let vcs = self.vcs.backend(repo.vcs, &repo.root)?;
            root_of.insert(import.clone(), repo.root.clone());

            let pinned = previous.get(&import);
            if let (Some(expected), Some(found)) = (pinned, rev_of_root.get(&repo.root)) {
                if expected != found {
                    return Err(PinsyncError::ConflictingPins {
                        root: repo.root,
                        identifier: import,
                        expected: expected.clone(),
                        found: found.clone(),
                    });
                }
            }

            let dir = cache.path_for(&repo.root);
            if !cache.exists(&repo.root) {
                info!("Cloning {} from {}", repo.root, repo.remote);
                if let Some(hook) = self.on_clone {
                    hook(&repo.root);
                }
                vcs.clone_repo(&dir, &repo.remote)?;
                outcome.cloned.push(repo.root.clone());
            }

            let state = vcs.inspect(&dir)?;
            if state.dirty {
                return Err(PinsyncError::DirtyCache {
                    root: repo.root,
                    path: dir,
                });
            }

            let revision = match pinned {
                Some(pin) if *pin != state.revision => {
                    info!("Updating {} to {pin}", repo.root);
                    vcs.checkout_revision(&dir, pin)?;
                    outcome.updated.push((repo.root.clone(), pin.clone()));
                    pin.clone()
                }
                Some(pin) => pin.clone(),
                None => {
                    debug!("Adopting {} at {}", repo.root, state.revision);
                    state.revision
                }
            };
            rev_of_root.insert(repo.root.clone(), revision);

            let pkg_dir = cache.path_for(&import);
            let pkg = self
                .inspector
                .inspect(&pkg_dir)?
                .ok_or_else(|| InspectError::NoSources {
                    package: import.clone(),
                    path: pkg_dir.clone(),
                })?;
            processed.insert(import);

            for dep in self.inspector.non_std_imports(&pkg) {
                if !processed.contains(&dep) && !outcome.project_packages.contains(&dep) {
                    queue.insert(dep);
                }
            }
        }

        outcome.pinlist = Pinlist::from_pairs(root_of.iter().filter_map(|(import, root)| {
            rev_of_root
                .get(root)
                .map(|rev| (import.clone(), rev.clone()))
        }));
        Ok(outcome)
    }
}
