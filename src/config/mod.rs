//! Configuration and constants
//!
//! - [`defaults`] - Project layout names and build tool defaults
//! - [`project`] - Optional per-project `pinsync/config.toml`

pub mod defaults;
pub mod project;
