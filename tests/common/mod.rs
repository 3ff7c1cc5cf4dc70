//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new, empty directory (not yet a pinsync project)
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a directory that is a pinsync project
    pub fn init() -> Self {
        let project = Self::new();
        project.create_dir("pinsync");
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Write a Go package under `src/<package>` importing `imports`
    pub fn create_package(&self, package: &str, imports: &[&str]) {
        let name = package.rsplit('/').next().unwrap_or("main");
        self.create_file(&format!("src/{package}/{name}.go"), &go_file(name, imports));
    }

    /// Route `prefix` to a local git repository via pinsync/config.toml
    pub fn add_repo_override(&self, prefix: &str, remote: &Path) {
        let path = self.dir.path().join("pinsync/config.toml");
        let mut config = std::fs::read_to_string(&path).unwrap_or_default();
        config.push_str(&format!(
            "\n[[repo]]\nprefix = \"{prefix}\"\nvcs = \"git\"\nremote = \"{}\"\n",
            remote.display()
        ));
        std::fs::write(path, config).expect("Failed to write config");
    }

    /// Run pinsync in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        self.run_in(&self.path(), args)
    }

    /// Run pinsync in `dir`
    pub fn run_in(&self, dir: &Path, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_pinsync"))
            .current_dir(dir)
            .args(args)
            .env_remove("RUST_LOG")
            .env_remove("PINSYNC_BUILD_TOOL")
            .output()
            .expect("Failed to execute pinsync")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Go source file for `package` importing `imports`
pub fn go_file(package: &str, imports: &[&str]) -> String {
    let mut src = format!("package {package}\n\nimport (\n");
    for import in imports {
        src.push_str(&format!("\t\"{import}\"\n"));
    }
    src.push_str(")\n");
    src
}

/// Whether git is installed; tests that need it return early otherwise
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

/// Run git in `dir` and return trimmed stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
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

/// Local upstream git repository
pub struct Upstream {
    pub dir: TempDir,
}

impl Upstream {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        git(dir.path(), &["init", "--quiet"]);
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write files and commit them; returns the new revision
    pub fn commit<S: AsRef<str>>(&self, files: &[(&str, S)]) -> String {
        for (name, content) in files {
            let path = self.dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create parent directories");
            }
            std::fs::write(path, content.as_ref()).expect("Failed to write file");
        }
        git(self.path(), &["add", "."]);
        git(self.path(), &["commit", "--quiet", "-m", "change"]);
        git(self.path(), &["rev-parse", "HEAD"])
    }
}

/// Pin file content for `(name, rev)` pairs, sorted as pinsync writes it
pub fn pin_file(deps: &[(&str, &str)]) -> String {
    let mut deps = deps.to_vec();
    deps.sort();
    let records: Vec<_> = deps
        .iter()
        .map(|(name, rev)| serde_json::json!({ "name": name, "rev": rev }))
        .collect();
    serde_json::to_string(&serde_json::json!({ "deps": records })).expect("Failed to serialize")
}
