//! Core business logic module
//!
//! Dependency pinning for pinsync. Process and filesystem access goes
//! through the traits in [`crate::infra`], so the engines run against
//! in-memory fakes in tests.
//!
//! # Submodules
//!
//! - [`sorted_set`] - Ordered set of identifiers, used as the sync work queue
//! - [`pinlist`] - Pin file (`pinsync/deps.json`) parsing and writing
//! - [`project`] - Project discovery and layout
//! - [`sync`] - Fetch, check out and pin every reachable dependency
//! - [`verify`] - Check the cache against the pin file and prune it
//! - [`build_env`] - Build tool environment for the passthrough path

pub mod build_env;
pub mod pinlist;
pub mod project;
pub mod sorted_set;
pub mod sync;
pub mod verify;
