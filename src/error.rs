//! Error types for pinsync
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Pin file errors
#[derive(Error, Debug)]
pub enum PinlistError {
    /// Pin file is not valid JSON or has the wrong shape
    #[error("Failed to parse pin file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Pin file parsed but a record is invalid
    #[error("Invalid pin file '{path}': {reason}")]
    Validation { path: PathBuf, reason: String },

    /// Pin file could not be serialized
    #[error("Failed to serialize pin file: {error}")]
    Serialize { error: String },

    /// Filesystem error reading or writing the pin file
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Version control errors
#[derive(Error, Debug)]
pub enum VcsError {
    /// Clone of a remote repository failed
    #[error("Failed to clone '{remote}' into '{dir}':\n{output}")]
    CloneFailed {
        remote: String,
        dir: PathBuf,
        output: String,
    },

    /// Revision is unknown locally and after fetching
    #[error("Revision '{revision}' not found in '{dir}' (even after fetching)")]
    RevisionNotFound { dir: PathBuf, revision: String },

    /// A VCS command exited unsuccessfully
    #[error("Command '{command}' failed in '{dir}':\n{output}")]
    CommandFailed {
        command: String,
        dir: PathBuf,
        output: String,
    },

    /// The VCS executable is not installed
    #[error("Missing '{tool}' command; is it installed and on PATH?")]
    ToolNotFound { tool: String },

    /// The repository uses a VCS kind pinsync does not handle
    #[error("Repository '{root}' uses {kind}, which is not supported (only git and hg)")]
    UnsupportedVcs { kind: String, root: String },
}

/// Repository location errors
#[derive(Error, Debug)]
pub enum LocateError {
    /// Identifier cannot name a repository path
    #[error("Invalid import path '{import}'")]
    InvalidImport { import: String },

    /// No rule matches the identifier
    #[error(
        "Cannot determine repository for '{import}'; add a [[repo]] entry to pinsync/config.toml"
    )]
    Unrecognized { import: String },

    /// Configured override names an unknown VCS kind
    #[error("Unknown VCS kind '{kind}' for repository prefix '{prefix}'")]
    UnknownVcs { prefix: String, kind: String },
}

/// Source inspection errors
#[derive(Error, Debug)]
pub enum InspectError {
    /// Directory listing failed
    #[error("Failed to read directory '{path}': {error}")]
    ReadDir { path: PathBuf, error: String },

    /// Source file read failed
    #[error("Failed to read source file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// A dependency package has no buildable sources
    #[error("No Go source files for package '{package}' in '{path}'")]
    NoSources { package: String, path: PathBuf },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to move a file into place
    #[error("Failed to rename '{from}' to '{to}': {error}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to walk a directory tree
    #[error("Failed to scan '{path}': {error}")]
    Walk { path: PathBuf, error: String },
}

/// Project configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Top-level pinsync error type
#[derive(Error, Debug)]
pub enum PinsyncError {
    /// No project directory above the starting point
    #[error("No pinsync project found in '{start}' or any parent directory")]
    ProjectNotFound { start: PathBuf },

    /// Two identifiers in one repository carry different pins
    #[error(
        "Conflicting pins for repository '{root}': '{identifier}' is pinned to {expected}, \
         but the repository was already resolved to {found}"
    )]
    ConflictingPins {
        root: String,
        identifier: String,
        expected: String,
        found: String,
    },

    /// Cached working tree has local modifications
    #[error("Cached repository '{root}' at '{path}' is dirty (has uncommitted or untracked changes)")]
    DirtyCache { root: String, path: PathBuf },

    /// Pinned dependency has no cache entry
    #[error("Repository '{root}' (for dependency '{identifier}') is not cached. Run 'pinsync sync'.")]
    NotCached { identifier: String, root: String },

    /// Cached revision differs from the pin
    #[error("Pin file has revision {expected} for '{identifier}', but found {found} in cache ('{root}')")]
    RevisionMismatch {
        identifier: String,
        root: String,
        expected: String,
        found: String,
    },

    /// Build tool subcommand that would bypass pinning
    #[error("The command '{tool} {command}' cannot be used in a pinsync project")]
    DisabledCommand { tool: String, command: String },

    /// Build tool executable is not on PATH
    #[error("Build tool '{tool}' not found on PATH")]
    BuildToolNotFound { tool: String },

    /// Project paths cannot be joined into a search path
    #[error("Cannot build {var} from project paths: {error}")]
    InvalidSearchPath { var: String, error: String },

    /// Pin file error
    #[error("Pin file error: {0}")]
    Pinlist(#[from] PinlistError),

    /// Version control error
    #[error("VCS error: {0}")]
    Vcs(#[from] VcsError),

    /// Repository location error
    #[error("Locator error: {0}")]
    Locate(#[from] LocateError),

    /// Source inspection error
    #[error("Source error: {0}")]
    Inspect(#[from] InspectError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
