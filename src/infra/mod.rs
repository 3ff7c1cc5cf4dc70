//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, VCS processes, the dependency
//! cache and Go source scanning.

pub mod cache;
pub mod filesystem;
pub mod inspector;
pub mod locator;
pub mod vcs;
