//! Pin file handling
//!
//! The pin file (`pinsync/deps.json`) records the exact VCS revision of
//! every external package the project imports, directly or transitively.
//!
//! ```json
//! {
//! 	"deps": [
//! 		{
//! 			"name": "github.com/user/lib",
//! 			"rev": "0123abcd..."
//! 		}
//! 	]
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::PinlistError;
use crate::infra::filesystem;

/// Pinned dependency set
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pinlist {
    /// Pinned packages, sorted by name once normalized
    #[serde(default, deserialize_with = "null_as_empty")]
    pub deps: Vec<Dep>,
}

/// A pinned third-party package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dep {
    /// Import identifier of the package
    pub name: String,

    /// VCS revision (git commit hash, hg changeset id)
    pub rev: String,
}

impl Dep {
    pub fn new(name: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rev: rev.into(),
        }
    }
}

/// Older writers emit `"deps": null` for an empty list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Dep>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Dep>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Pinlist {
    /// Create an empty pin set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a normalized pin set from `(name, rev)` pairs
    pub fn from_pairs<I, N, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, R)>,
        N: Into<String>,
        R: Into<String>,
    {
        let mut pinlist = Self {
            deps: pairs
                .into_iter()
                .map(|(name, rev)| Dep::new(name, rev))
                .collect(),
        };
        pinlist.normalize();
        pinlist
    }

    /// Load a pin file
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, PinlistError> {
        let Some(content) = filesystem::read_file_if_exists(path)? else {
            return Ok(None);
        };
        let pinlist = Self::from_json(&content).map_err(|e| match e {
            PinlistError::Parse { error, .. } => PinlistError::Parse {
                path: path.to_path_buf(),
                error,
            },
            PinlistError::Validation { reason, .. } => PinlistError::Validation {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;
        Ok(Some(pinlist))
    }

    /// Load a pin file, treating an absent file as an empty set
    pub fn load_or_default(path: &Path) -> Result<Self, PinlistError> {
        Ok(Self::load(path)?.unwrap_or_default())
    }

    /// Parse and validate pin file content
    pub fn from_json(content: &str) -> Result<Self, PinlistError> {
        let pinlist: Self =
            serde_json::from_str(content).map_err(|e| PinlistError::Parse {
                path: Default::default(),
                error: e.to_string(),
            })?;
        pinlist.validate()?;
        Ok(pinlist)
    }

    /// Serialize to the on-disk form: tab-indented, trailing newline
    pub fn to_json(&self) -> Result<String, PinlistError> {
        let mut normalized = self.clone();
        normalized.normalize();

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        normalized
            .serialize(&mut ser)
            .map_err(|e| PinlistError::Serialize {
                error: e.to_string(),
            })?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| PinlistError::Serialize {
            error: e.to_string(),
        })
    }

    /// Normalize, serialize to a buffer, then atomically replace `path`
    pub fn save(&mut self, path: &Path) -> Result<(), PinlistError> {
        self.normalize();
        let content = self.to_json()?;
        filesystem::write_file_atomic(path, content.as_bytes())?;
        Ok(())
    }

    /// Sort records by name
    pub fn normalize(&mut self) {
        self.deps.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Check every record is well-formed and names are unique
    pub fn validate(&self) -> Result<(), PinlistError> {
        let mut seen = HashSet::new();
        for dep in &self.deps {
            if dep.name.is_empty() {
                return Err(invalid("bad dep name (empty string)".to_string()));
            }
            if dep.rev.is_empty() {
                return Err(invalid(format!("bad rev for '{}' (empty string)", dep.name)));
            }
            if !seen.insert(dep.name.as_str()) {
                return Err(invalid(format!("duplicate entry for '{}'", dep.name)));
            }
        }
        Ok(())
    }

    /// Name → revision lookup
    pub fn as_map(&self) -> HashMap<String, String> {
        self.deps
            .iter()
            .map(|dep| (dep.name.clone(), dep.rev.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }
}

fn invalid(reason: String) -> PinlistError {
    PinlistError::Validation {
        path: Default::default(),
        reason,
    }
}
