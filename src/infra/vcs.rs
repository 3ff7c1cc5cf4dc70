//! Version control operations
//!
//! Drives the `git` and `hg` executables on a single working directory:
//! clone, inspect (revision + dirty state) and checkout of a revision.
//! Each supported kind implements [`Vcs`]; [`VcsBackends`] resolves the
//! executables once and hands out the adapter for a repository's kind.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::VcsError;

/// VCS kind declared for a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Git,
    Mercurial,
    Subversion,
    Bazaar,
}

impl VcsKind {
    /// Parse the short command name (`git`, `hg`, `svn`, `bzr`)
    pub fn from_cmd(cmd: &str) -> Option<Self> {
        match cmd {
            "git" => Some(Self::Git),
            "hg" => Some(Self::Mercurial),
            "svn" => Some(Self::Subversion),
            "bzr" => Some(Self::Bazaar),
            _ => None,
        }
    }

    /// Short command name
    pub fn cmd(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Mercurial => "hg",
            Self::Subversion => "svn",
            Self::Bazaar => "bzr",
        }
    }

    /// Metadata directory inside a working copy
    pub fn metadata_dir(self) -> &'static str {
        match self {
            Self::Git => ".git",
            Self::Mercurial => ".hg",
            Self::Subversion => ".svn",
            Self::Bazaar => ".bzr",
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Git => "Git",
            Self::Mercurial => "Mercurial",
            Self::Subversion => "Subversion",
            Self::Bazaar => "Bazaar",
        };
        f.write_str(name)
    }
}

/// State of a working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoState {
    /// Current revision
    pub revision: String,
    /// Uncommitted or untracked changes present
    pub dirty: bool,
}

/// Operations on one kind of working directory
pub trait Vcs {
    fn kind(&self) -> VcsKind;

    /// Clone `remote` into `dir` at its default tip
    fn clone_repo(&self, dir: &Path, remote: &str) -> Result<(), VcsError>;

    /// Current revision and dirty state; never touches the network
    fn inspect(&self, dir: &Path) -> Result<RepoState, VcsError>;

    /// Make `revision` current, fetching first if it is unknown locally
    fn checkout_revision(&self, dir: &Path, revision: &str) -> Result<(), VcsError>;
}

/// Source of [`Vcs`] adapters by kind
pub trait VcsProvider {
    /// Adapter for `kind`; `root` is only used for error context
    fn backend(&self, kind: VcsKind, root: &str) -> Result<&dyn Vcs, VcsError>;
}

/// A resolved VCS executable
#[derive(Debug, Clone)]
struct Tool {
    name: &'static str,
    path: PathBuf,
}

impl Tool {
    /// Run with combined stdout+stderr, failing with the output attached
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, VcsError> {
        let (ok, output) = self.run_unchecked(dir, args)?;
        if ok {
            Ok(output)
        } else {
            Err(VcsError::CommandFailed {
                command: self.command_line(args),
                dir: dir.to_path_buf(),
                output,
            })
        }
    }

    /// Run and return stdout only, failing with the combined output attached
    fn run_stdout(&self, dir: &Path, args: &[&str]) -> Result<String, VcsError> {
        let output = self
            .command(dir, args)
            .output()
            .map_err(|e| self.spawn_error(dir, args, &e))?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(VcsError::CommandFailed {
                command: self.command_line(args),
                dir: dir.to_path_buf(),
                output: combine(&output.stdout, &output.stderr),
            })
        }
    }

    /// Run and report success plus combined output without failing
    fn run_unchecked(&self, dir: &Path, args: &[&str]) -> Result<(bool, String), VcsError> {
        let output = self
            .command(dir, args)
            .output()
            .map_err(|e| self.spawn_error(dir, args, &e))?;
        Ok((
            output.status.success(),
            combine(&output.stdout, &output.stderr),
        ))
    }

    fn command(&self, dir: &Path, args: &[&str]) -> Command {
        tracing::debug!("cd {}; {}", dir.display(), self.command_line(args));
        let mut cmd = Command::new(&self.path);
        cmd.args(args).current_dir(dir).env("PWD", dir);
        cmd
    }

    fn command_line(&self, args: &[&str]) -> String {
        let mut line = self.name.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn spawn_error(&self, dir: &Path, args: &[&str], e: &std::io::Error) -> VcsError {
        VcsError::CommandFailed {
            command: self.command_line(args),
            dir: dir.to_path_buf(),
            output: e.to_string(),
        }
    }
}

fn combine(stdout: &[u8], stderr: &[u8]) -> String {
    let mut out = String::from_utf8_lossy(stdout).into_owned();
    out.push_str(&String::from_utf8_lossy(stderr));
    out
}

/// Create the parent of a clone destination and return it
fn clone_parent(dir: &Path, remote: &str) -> Result<PathBuf, VcsError> {
    let parent = dir.parent().map(Path::to_path_buf).unwrap_or_default();
    std::fs::create_dir_all(&parent).map_err(|e| VcsError::CloneFailed {
        remote: remote.to_string(),
        dir: dir.to_path_buf(),
        output: format!("cannot create '{}': {e}", parent.display()),
    })?;
    Ok(parent)
}

/// Git working directories
#[derive(Debug, Clone)]
pub struct Git {
    tool: Tool,
}

impl Git {
    pub fn new(path: PathBuf) -> Self {
        Self {
            tool: Tool { name: "git", path },
        }
    }

    fn has_commit(&self, dir: &Path, revision: &str) -> Result<bool, VcsError> {
        let (ok, output) = self.tool.run_unchecked(dir, &["cat-file", "-t", revision])?;
        Ok(ok && output.trim() == "commit")
    }
}

impl Vcs for Git {
    fn kind(&self) -> VcsKind {
        VcsKind::Git
    }

    fn clone_repo(&self, dir: &Path, remote: &str) -> Result<(), VcsError> {
        let parent = clone_parent(dir, remote)?;
        let dest = dir.to_string_lossy().into_owned();
        self.tool
            .run(&parent, &["clone", "--", remote, dest.as_str()])
            .map_err(|e| clone_failed(e, remote, dir))?;
        Ok(())
    }

    fn inspect(&self, dir: &Path) -> Result<RepoState, VcsError> {
        let revision = self.tool.run_stdout(dir, &["rev-parse", "HEAD"])?;
        let status = self
            .tool
            .run_stdout(dir, &["status", "--porcelain", "--untracked-files=normal"])?;
        Ok(RepoState {
            revision: revision.trim().to_string(),
            dirty: !status.trim().is_empty(),
        })
    }

    fn checkout_revision(&self, dir: &Path, revision: &str) -> Result<(), VcsError> {
        if !self.has_commit(dir, revision)? {
            tracing::info!("Revision {revision} not present in {}; fetching", dir.display());
            self.tool.run(dir, &["fetch", "--tags", "origin"])?;
            if !self.has_commit(dir, revision)? {
                return Err(VcsError::RevisionNotFound {
                    dir: dir.to_path_buf(),
                    revision: revision.to_string(),
                });
            }
        }
        self.tool.run(dir, &["checkout", "--quiet", revision])?;
        Ok(())
    }
}

/// Mercurial working directories
#[derive(Debug, Clone)]
pub struct Mercurial {
    tool: Tool,
}

impl Mercurial {
    pub fn new(path: PathBuf) -> Self {
        Self {
            tool: Tool { name: "hg", path },
        }
    }

    fn has_revision(&self, dir: &Path, revision: &str) -> Result<bool, VcsError> {
        let (ok, _) = self
            .tool
            .run_unchecked(dir, &["log", "-r", revision, "--template", "{node}"])?;
        Ok(ok)
    }
}

impl Vcs for Mercurial {
    fn kind(&self) -> VcsKind {
        VcsKind::Mercurial
    }

    fn clone_repo(&self, dir: &Path, remote: &str) -> Result<(), VcsError> {
        let parent = clone_parent(dir, remote)?;
        let dest = dir.to_string_lossy().into_owned();
        self.tool
            .run(&parent, &["clone", "--", remote, dest.as_str()])
            .map_err(|e| clone_failed(e, remote, dir))?;
        Ok(())
    }

    fn inspect(&self, dir: &Path) -> Result<RepoState, VcsError> {
        let output = self.tool.run_stdout(dir, &["identify", "--debug", "--id"])?;
        Ok(parse_hg_identify(&output))
    }

    fn checkout_revision(&self, dir: &Path, revision: &str) -> Result<(), VcsError> {
        if !self.has_revision(dir, revision)? {
            tracing::info!("Revision {revision} not present in {}; pulling", dir.display());
            self.tool.run(dir, &["pull"])?;
            if !self.has_revision(dir, revision)? {
                return Err(VcsError::RevisionNotFound {
                    dir: dir.to_path_buf(),
                    revision: revision.to_string(),
                });
            }
        }
        self.tool.run(dir, &["update", "--check", revision])?;
        Ok(())
    }
}

/// `hg identify --id` marks a modified working directory with a trailing `+`
fn parse_hg_identify(output: &str) -> RepoState {
    let id = output.trim();
    match id.strip_suffix('+') {
        Some(revision) => RepoState {
            revision: revision.to_string(),
            dirty: true,
        },
        None => RepoState {
            revision: id.to_string(),
            dirty: false,
        },
    }
}

fn clone_failed(e: VcsError, remote: &str, dir: &Path) -> VcsError {
    match e {
        VcsError::CommandFailed { output, .. } => VcsError::CloneFailed {
            remote: remote.to_string(),
            dir: dir.to_path_buf(),
            output,
        },
        other => other,
    }
}

/// Installed VCS executables, located once per run
#[derive(Debug, Clone, Default)]
pub struct VcsBackends {
    git: Option<Git>,
    hg: Option<Mercurial>,
}

impl VcsBackends {
    /// Locate `git` and `hg` on `PATH`
    pub fn from_path() -> Self {
        let git = which::which("git").ok().map(Git::new);
        let hg = which::which("hg").ok().map(Mercurial::new);
        tracing::debug!(
            "VCS tools: git={:?} hg={:?}",
            git.as_ref().map(|g| &g.tool.path),
            hg.as_ref().map(|h| &h.tool.path)
        );
        Self { git, hg }
    }

    /// Use explicit executables
    pub fn new(git: Option<PathBuf>, hg: Option<PathBuf>) -> Self {
        Self {
            git: git.map(Git::new),
            hg: hg.map(Mercurial::new),
        }
    }
}

impl VcsProvider for VcsBackends {
    fn backend(&self, kind: VcsKind, root: &str) -> Result<&dyn Vcs, VcsError> {
        match kind {
            VcsKind::Git => self
                .git
                .as_ref()
                .map(|g| g as &dyn Vcs)
                .ok_or_else(|| VcsError::ToolNotFound {
                    tool: "git".to_string(),
                }),
            VcsKind::Mercurial => self
                .hg
                .as_ref()
                .map(|h| h as &dyn Vcs)
                .ok_or_else(|| VcsError::ToolNotFound {
                    tool: "hg".to_string(),
                }),
            VcsKind::Subversion | VcsKind::Bazaar => Err(VcsError::UnsupportedVcs {
                kind: kind.to_string(),
                root: root.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    // ============================================
    // Unit Tests - VcsKind
    // ============================================

    #[test]
    fn test_vcs_kind_from_cmd() {
        assert_eq!(VcsKind::from_cmd("git"), Some(VcsKind::Git));
        assert_eq!(VcsKind::from_cmd("hg"), Some(VcsKind::Mercurial));
        assert_eq!(VcsKind::from_cmd("svn"), Some(VcsKind::Subversion));
        assert_eq!(VcsKind::from_cmd("bzr"), Some(VcsKind::Bazaar));
        assert_eq!(VcsKind::from_cmd("cvs"), None);
    }

    #[test]
    fn test_vcs_kind_metadata_dir() {
        assert_eq!(VcsKind::Git.metadata_dir(), ".git");
        assert_eq!(VcsKind::Mercurial.metadata_dir(), ".hg");
    }

    // ============================================
    // Unit Tests - hg identify parsing
    // ============================================

    #[test]
    fn test_parse_hg_identify_clean() {
        let state = parse_hg_identify("0123456789abcdef0123456789abcdef01234567\n");
        assert_eq!(state.revision, "0123456789abcdef0123456789abcdef01234567");
        assert!(!state.dirty);
    }

    #[test]
    fn test_parse_hg_identify_dirty() {
        let state = parse_hg_identify("0123456789abcdef0123456789abcdef01234567+\n");
        assert_eq!(state.revision, "0123456789abcdef0123456789abcdef01234567");
        assert!(state.dirty);
    }

    // ============================================
    // Unit Tests - Backend selection
    // ============================================

    #[test]
    fn test_backend_unsupported_kind() {
        let backends = VcsBackends::new(Some(PathBuf::from("git")), None);
        let result = backends.backend(VcsKind::Bazaar, "launchpad.net/foo");
        match result {
            Err(VcsError::UnsupportedVcs { kind, root }) => {
                assert_eq!(kind, "Bazaar");
                assert_eq!(root, "launchpad.net/foo");
            }
            other => panic!("Expected UnsupportedVcs, got: {:?}", other.map(|v| v.kind())),
        }
    }

    #[test]
    fn test_backend_missing_tool() {
        let backends = VcsBackends::new(None, None);
        let result = backends.backend(VcsKind::Mercurial, "hg.sr.ht/~u/r");
        assert!(matches!(result, Err(VcsError::ToolNotFound { .. })));
    }

    #[test]
    fn test_backend_selects_kind() {
        let backends = VcsBackends::new(Some(PathBuf::from("git")), Some(PathBuf::from("hg")));
        assert_eq!(backends.backend(VcsKind::Git, "r").unwrap().kind(), VcsKind::Git);
        assert_eq!(
            backends.backend(VcsKind::Mercurial, "r").unwrap().kind(),
            VcsKind::Mercurial
        );
    }

    // ============================================
    // Integration Tests - real git, local repositories
    // Skipped when git is not installed
    // ============================================

    fn git_bin() -> Option<PathBuf> {
        which::which("git").ok()
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Upstream repository with two commits; returns (path, first, second)
    fn upstream(temp: &TempDir) -> (PathBuf, String, String) {
        let repo = temp.path().join("upstream");
        std::fs::create_dir_all(&repo).unwrap();
        git(&repo, &["init", "--quiet"]);
        std::fs::write(repo.join("a.go"), "package a\n").unwrap();
        git(&repo, &["add", "."]);
        git(&repo, &["commit", "--quiet", "-m", "one"]);
        let first = git(&repo, &["rev-parse", "HEAD"]);
        std::fs::write(repo.join("b.go"), "package a\n").unwrap();
        git(&repo, &["add", "."]);
        git(&repo, &["commit", "--quiet", "-m", "two"]);
        let second = git(&repo, &["rev-parse", "HEAD"]);
        (repo, first, second)
    }

    #[test]
    fn test_git_clone_inspect_checkout() {
        let Some(bin) = git_bin() else { return };
        let temp = TempDir::new().unwrap();
        let (remote, first, second) = upstream(&temp);
        let vcs = Git::new(bin);
        let dest = temp.path().join("cache/src/example.com/repo");

        vcs.clone_repo(&dest, &remote.to_string_lossy()).unwrap();
        let state = vcs.inspect(&dest).unwrap();
        assert_eq!(state.revision, second);
        assert!(!state.dirty);

        vcs.checkout_revision(&dest, &first).unwrap();
        assert_eq!(vcs.inspect(&dest).unwrap().revision, first);
    }

    #[test]
    fn test_git_inspect_dirty_untracked() {
        let Some(bin) = git_bin() else { return };
        let temp = TempDir::new().unwrap();
        let (remote, _, _) = upstream(&temp);
        let vcs = Git::new(bin);
        let dest = temp.path().join("clone");

        vcs.clone_repo(&dest, &remote.to_string_lossy()).unwrap();
        std::fs::write(dest.join("new.go"), "package a\n").unwrap();

        assert!(vcs.inspect(&dest).unwrap().dirty);
    }

    #[test]
    fn test_git_checkout_fetches_new_commit() {
        let Some(bin) = git_bin() else { return };
        let temp = TempDir::new().unwrap();
        let (remote, _, _) = upstream(&temp);
        let vcs = Git::new(bin);
        let dest = temp.path().join("clone");
        vcs.clone_repo(&dest, &remote.to_string_lossy()).unwrap();

        std::fs::write(remote.join("c.go"), "package a\n").unwrap();
        git(&remote, &["add", "."]);
        git(&remote, &["commit", "--quiet", "-m", "three"]);
        let third = git(&remote, &["rev-parse", "HEAD"]);

        vcs.checkout_revision(&dest, &third).unwrap();
        assert_eq!(vcs.inspect(&dest).unwrap().revision, third);
    }

    #[test]
    fn test_git_checkout_unknown_revision() {
        let Some(bin) = git_bin() else { return };
        let temp = TempDir::new().unwrap();
        let (remote, _, _) = upstream(&temp);
        let vcs = Git::new(bin);
        let dest = temp.path().join("clone");
        vcs.clone_repo(&dest, &remote.to_string_lossy()).unwrap();

        let result = vcs.checkout_revision(&dest, "0000000000000000000000000000000000000001");
        assert!(matches!(result, Err(VcsError::RevisionNotFound { .. })));
    }

    #[test]
    fn test_git_clone_invalid_remote() {
        let Some(bin) = git_bin() else { return };
        let temp = TempDir::new().unwrap();
        let vcs = Git::new(bin);

        let result = vcs.clone_repo(
            &temp.path().join("dest"),
            &temp.path().join("does-not-exist").to_string_lossy(),
        );
        match result {
            Err(VcsError::CloneFailed { output, .. }) => assert!(!output.is_empty()),
            other => panic!("Expected CloneFailed, got: {other:?}"),
        }
    }

    // ============================================
    // Integration Tests - real hg, local repositories
    // Skipped when hg is not installed
    // ============================================

    fn hg_bin() -> Option<PathBuf> {
        which::which("hg").ok()
    }

    fn hg(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("hg")
            .args(["--config", "ui.username=test <test@example.com>"])
            .args(args)
            .current_dir(dir)
            .env("HGPLAIN", "1")
            .output()
            .expect("Failed to run hg");
        assert!(
            output.status.success(),
            "hg {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn hg_commit(repo: &Path, file: &str, message: &str) -> String {
        std::fs::write(repo.join(file), "package a\n").unwrap();
        hg(repo, &["add", file]);
        hg(repo, &["commit", "-m", message]);
        hg(repo, &["log", "-r", ".", "--template", "{node}"])
    }

    /// Mercurial upstream with two changesets; returns (path, first, second)
    fn hg_upstream(temp: &TempDir) -> (PathBuf, String, String) {
        let repo = temp.path().join("hg-upstream");
        std::fs::create_dir_all(&repo).unwrap();
        hg(&repo, &["init"]);
        let first = hg_commit(&repo, "a.go", "one");
        let second = hg_commit(&repo, "b.go", "two");
        (repo, first, second)
    }

    #[test]
    fn test_hg_clone_inspect_checkout() {
        let Some(bin) = hg_bin() else { return };
        let temp = TempDir::new().unwrap();
        let (remote, first, second) = hg_upstream(&temp);
        let vcs = Mercurial::new(bin);
        let dest = temp.path().join("cache/src/hg.sr.ht/~u/repo");

        vcs.clone_repo(&dest, &remote.to_string_lossy()).unwrap();
        assert!(dest.join(".hg").is_dir());
        let state = vcs.inspect(&dest).unwrap();
        assert_eq!(state.revision, second);
        assert!(!state.dirty);

        vcs.checkout_revision(&dest, &first).unwrap();
        assert_eq!(vcs.inspect(&dest).unwrap().revision, first);
        assert!(!dest.join("b.go").exists());
    }

    #[test]
    fn test_hg_inspect_dirty_modified_file() {
        let Some(bin) = hg_bin() else { return };
        let temp = TempDir::new().unwrap();
        let (remote, _, second) = hg_upstream(&temp);
        let vcs = Mercurial::new(bin);
        let dest = temp.path().join("clone");

        vcs.clone_repo(&dest, &remote.to_string_lossy()).unwrap();
        std::fs::write(dest.join("a.go"), "package a\n\nvar X = 1\n").unwrap();

        let state = vcs.inspect(&dest).unwrap();
        assert!(state.dirty);
        assert_eq!(state.revision, second);
    }

    #[test]
    fn test_hg_checkout_pulls_new_changeset() {
        let Some(bin) = hg_bin() else { return };
        let temp = TempDir::new().unwrap();
        let (remote, _, _) = hg_upstream(&temp);
        let vcs = Mercurial::new(bin);
        let dest = temp.path().join("clone");
        vcs.clone_repo(&dest, &remote.to_string_lossy()).unwrap();

        let third = hg_commit(&remote, "c.go", "three");

        vcs.checkout_revision(&dest, &third).unwrap();
        assert_eq!(vcs.inspect(&dest).unwrap().revision, third);
    }

    #[test]
    fn test_hg_checkout_unknown_revision() {
        let Some(bin) = hg_bin() else { return };
        let temp = TempDir::new().unwrap();
        let (remote, _, _) = hg_upstream(&temp);
        let vcs = Mercurial::new(bin);
        let dest = temp.path().join("clone");
        vcs.clone_repo(&dest, &remote.to_string_lossy()).unwrap();

        let result = vcs.checkout_revision(&dest, "0000000000000000000000000000000000000001");
        assert!(matches!(result, Err(VcsError::RevisionNotFound { .. })));
    }

    // ============================================
    // Property-Based Tests
    // ============================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The dirty marker is stripped and reported for any changeset id
        #[test]
        fn prop_hg_identify_marker(id in "[0-9a-f]{40}", dirty in any::<bool>()) {
            let raw = if dirty { format!("{id}+\n") } else { format!("{id}\n") };
            let state = parse_hg_identify(&raw);
            prop_assert_eq!(state.revision, id);
            prop_assert_eq!(state.dirty, dirty);
        }
    }
}
