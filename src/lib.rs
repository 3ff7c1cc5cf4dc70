//! pinsync - reproducible Go dependencies
//!
//! Pins every third-party package a Go project imports to an exact VCS
//! revision, keeps the checkouts in a project-local cache, and runs the Go
//! tool against that cache.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Sync and verify engines, pin file, project layout
//! - [`infra`] - Infrastructure layer (VCS processes, filesystem, cache, source scanning)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
