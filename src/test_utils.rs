//! Test utilities
//!
//! Generators for property-based tests and an in-memory VCS that
//! materializes Go sources into cache directories, so the engines can be
//! exercised without git or hg installed.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a github-style import path
    pub fn import_path() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9-]{0,10}", "[a-z][a-z0-9-]{0,10}", "(/[a-z][a-z0-9]{0,6}){0,2}")
            .prop_map(|(user, repo, sub)| format!("github.com/{user}/{repo}{sub}"))
    }

    /// Generate a full git revision (40 hex characters)
    pub fn revision() -> impl Strategy<Value = String> {
        "[0-9a-f]{40}"
    }
}

#[cfg(test)]
pub mod fakes {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::Path;

    use crate::error::VcsError;
    use crate::infra::vcs::{RepoState, Vcs, VcsKind, VcsProvider};

    /// One revision of a fake upstream: files relative to the repository root
    #[derive(Debug, Clone)]
    pub struct FakeRevision {
        pub id: String,
        pub files: Vec<(String, String)>,
    }

    /// Upstream repository; the last revision is the default tip
    #[derive(Debug, Clone, Default)]
    pub struct FakeRemote {
        pub revisions: Vec<FakeRevision>,
    }

    impl FakeRemote {
        pub fn revision<S: AsRef<str>>(mut self, id: &str, files: &[(&str, S)]) -> Self {
            self.revisions.push(FakeRevision {
                id: id.to_string(),
                files: files
                    .iter()
                    .map(|(p, c)| ((*p).to_string(), c.as_ref().to_string()))
                    .collect(),
            });
            self
        }

        fn find(&self, id: &str) -> Option<&FakeRevision> {
            self.revisions.iter().find(|r| r.id == id)
        }
    }

    /// Go file importing `imports`
    pub fn go_file(package: &str, imports: &[&str]) -> String {
        let mut src = format!("package {package}\n\nimport (\n");
        for import in imports {
            src.push_str(&format!("\t\"{import}\"\n"));
        }
        src.push_str(")\n");
        src
    }

    /// Git-like VCS backed by in-memory remotes
    ///
    /// A checkout keeps its revision in `.git/HEAD` and its remote in
    /// `.git/remote`; `.git/DIRTY` marks local changes.
    #[derive(Debug, Default)]
    pub struct FakeVcs {
        remotes: HashMap<String, FakeRemote>,
        pub clones: RefCell<Vec<String>>,
        pub checkouts: RefCell<Vec<(String, String)>>,
    }

    impl FakeVcs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_remote(mut self, remote: &str, repo: FakeRemote) -> Self {
            self.remotes.insert(remote.to_string(), repo);
            self
        }

        /// Mark a checkout as having uncommitted changes
        pub fn make_dirty(dir: &Path) {
            std::fs::write(dir.join(".git/DIRTY"), "").unwrap();
        }

        /// Force a checkout's recorded revision
        pub fn set_head(dir: &Path, rev: &str) {
            std::fs::write(dir.join(".git/HEAD"), rev).unwrap();
        }

        fn materialize(dir: &Path, rev: &FakeRevision) -> Result<(), VcsError> {
            for (path, content) in &rev.files {
                let file = dir.join(path);
                if let Some(parent) = file.parent() {
                    std::fs::create_dir_all(parent).map_err(io_err(dir))?;
                }
                std::fs::write(&file, content).map_err(io_err(dir))?;
            }
            std::fs::write(dir.join(".git/HEAD"), &rev.id).map_err(io_err(dir))
        }

        fn remote_of(&self, dir: &Path) -> Result<&FakeRemote, VcsError> {
            let remote = std::fs::read_to_string(dir.join(".git/remote")).map_err(io_err(dir))?;
            self.remotes.get(remote.trim()).ok_or_else(|| VcsError::CommandFailed {
                command: "fake remote".to_string(),
                dir: dir.to_path_buf(),
                output: format!("unknown remote {remote}"),
            })
        }
    }

    fn io_err(dir: &Path) -> impl Fn(std::io::Error) -> VcsError + '_ {
        move |e| VcsError::CommandFailed {
            command: "fake".to_string(),
            dir: dir.to_path_buf(),
            output: e.to_string(),
        }
    }

    impl Vcs for FakeVcs {
        fn kind(&self) -> VcsKind {
            VcsKind::Git
        }

        fn clone_repo(&self, dir: &Path, remote: &str) -> Result<(), VcsError> {
            let repo = self.remotes.get(remote).ok_or_else(|| VcsError::CloneFailed {
                remote: remote.to_string(),
                dir: dir.to_path_buf(),
                output: "repository not found".to_string(),
            })?;
            let tip = repo.revisions.last().ok_or_else(|| VcsError::CloneFailed {
                remote: remote.to_string(),
                dir: dir.to_path_buf(),
                output: "empty repository".to_string(),
            })?;
            std::fs::create_dir_all(dir.join(".git")).map_err(io_err(dir))?;
            std::fs::write(dir.join(".git/remote"), remote).map_err(io_err(dir))?;
            Self::materialize(dir, tip)?;
            self.clones.borrow_mut().push(remote.to_string());
            Ok(())
        }

        fn inspect(&self, dir: &Path) -> Result<RepoState, VcsError> {
            let revision = std::fs::read_to_string(dir.join(".git/HEAD")).map_err(io_err(dir))?;
            Ok(RepoState {
                revision: revision.trim().to_string(),
                dirty: dir.join(".git/DIRTY").exists(),
            })
        }

        fn checkout_revision(&self, dir: &Path, revision: &str) -> Result<(), VcsError> {
            let repo = self.remote_of(dir)?;
            let rev = repo.find(revision).ok_or_else(|| VcsError::RevisionNotFound {
                dir: dir.to_path_buf(),
                revision: revision.to_string(),
            })?;
            Self::materialize(dir, rev)?;
            self.checkouts
                .borrow_mut()
                .push((dir.display().to_string(), revision.to_string()));
            Ok(())
        }
    }

    impl VcsProvider for FakeVcs {
        fn backend(&self, kind: VcsKind, root: &str) -> Result<&dyn Vcs, VcsError> {
            match kind {
                VcsKind::Git | VcsKind::Mercurial => Ok(self),
                _ => Err(VcsError::UnsupportedVcs {
                    kind: kind.to_string(),
                    root: root.to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_import_path_generator(path in import_path()) {
            prop_assert!(path.starts_with("github.com/"));
            prop_assert!(path.split('/').count() >= 3);
            prop_assert!(path.split('/').all(|seg| !seg.is_empty()));
        }

        #[test]
        fn test_revision_generator(rev in revision()) {
            prop_assert_eq!(rev.len(), 40);
            prop_assert!(rev.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
