//! Go source inspection
//!
//! Lists the import paths of the Go package in a directory without
//! invoking the Go toolchain. Only the import block at the top of each
//! file is read; test files are included so test-only imports are pinned
//! too.

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::core::sorted_set::SortedSet;
use crate::error::InspectError;

/// Package found in a source directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePackage {
    /// Package clause name
    pub name: String,
    /// Every imported path, standard library included
    pub imports: SortedSet,
}

/// Reads package imports from source directories
pub trait SourceInspector {
    /// Package in `dir`, or `None` if it holds no source files
    fn inspect(&self, dir: &Path) -> Result<Option<SourcePackage>, InspectError>;

    fn is_standard_library(&self, import: &str) -> bool;

    /// Imports of `pkg` outside the standard library
    fn non_std_imports(&self, pkg: &SourcePackage) -> SortedSet {
        pkg.imports
            .iter()
            .filter(|import| !self.is_standard_library(import))
            .cloned()
            .collect()
    }
}

/// Packages and external imports of a project tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectImports {
    /// Identifiers of the project's own packages
    pub packages: SortedSet,
    /// Immediate non-standard imports, minus the project's own packages
    pub imports: SortedSet,
}

/// Discover the project's packages under `<root>/src` plus `root` itself
pub fn project_imports(
    inspector: &dyn SourceInspector,
    root: &Path,
    src_dir: &Path,
) -> Result<ProjectImports, InspectError> {
    let mut result = ProjectImports::default();

    let mut dirs: Vec<(String, PathBuf)> = package_dirs(src_dir)?
        .into_iter()
        .filter_map(|dir| {
            let rel = dir.strip_prefix(src_dir).ok()?;
            let id: Vec<_> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            Some((id.join("/"), dir))
        })
        .collect();
    dirs.push((".".to_string(), root.to_path_buf()));

    for (id, dir) in dirs {
        let Some(pkg) = inspector.inspect(&dir)? else {
            continue;
        };
        tracing::debug!("Project package {id} ({})", pkg.name);
        result.imports.extend(inspector.non_std_imports(&pkg));
        result.packages.insert(id);
    }

    let own: Vec<String> = result
        .imports
        .iter()
        .filter(|import| result.packages.contains(import))
        .cloned()
        .collect();
    for import in own {
        result.imports.remove(&import);
    }

    Ok(result)
}

/// Directories under `src_dir` that may hold packages
///
/// Skips VCS metadata, `testdata`, and names starting with `.` or `_`, the
/// same directories the Go tool ignores.
fn package_dirs(src_dir: &Path) -> Result<Vec<PathBuf>, InspectError> {
    if !src_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    let walker = WalkDir::new(src_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !(e.file_type().is_dir() && is_ignored_dir(&name))
        });
    for entry in walker {
        let entry = entry.map_err(|e| InspectError::ReadDir {
            path: src_dir.to_path_buf(),
            error: e.to_string(),
        })?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

fn is_ignored_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || name == "testdata"
}

/// Regex-based reader for Go sources
pub struct GoSourceInspector {
    comments: Regex,
    package: Regex,
    decl_end: Regex,
    single: Regex,
    block: Regex,
    path: Regex,
    ignore_tag: Regex,
}

impl std::fmt::Debug for GoSourceInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GoSourceInspector")
    }
}

impl Default for GoSourceInspector {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in Go source pattern is valid")
}

impl GoSourceInspector {
    pub fn new() -> Self {
        Self {
            comments: compile(r"(?s)/\*.*?\*/|//[^\n]*"),
            package: compile(r"(?m)^\s*package\s+([A-Za-z_][A-Za-z0-9_]*)"),
            decl_end: compile(r"(?m)^(func|type|var|const)\b"),
            single: compile(r#"(?m)^\s*import\s+(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?("[^"]*"|`[^`]*`)"#),
            block: compile(r"(?s)\bimport\s*\(([^)]*)\)"),
            path: compile(r#""([^"]*)"|`([^`]*)`"#),
            ignore_tag: compile(r"(?m)^//\s*(?:\+build|go:build)\s+ignore\s*$"),
        }
    }

    /// Parse one file; returns the package name and imports
    pub fn parse_source(&self, source: &str) -> Option<(String, Vec<String>)> {
        // Build constraints only count above the package clause
        let preamble = match self.package.find(source) {
            Some(m) => &source[..m.start()],
            None => source,
        };
        if self.ignore_tag.is_match(preamble) {
            return None;
        }
        let stripped = self.comments.replace_all(source, "");
        let header = match self.decl_end.find(&stripped) {
            Some(m) => &stripped[..m.start()],
            None => &stripped[..],
        };
        let name = self.package.captures(header)?.get(1)?.as_str().to_string();

        let mut imports = Vec::new();
        for caps in self.block.captures_iter(header) {
            if let Some(body) = caps.get(1) {
                imports.extend(self.paths(body.as_str()));
            }
        }
        for caps in self.single.captures_iter(header) {
            if let Some(lit) = caps.get(1) {
                imports.extend(self.paths(lit.as_str()));
            }
        }
        Some((name, imports))
    }

    fn paths(&self, text: &str) -> Vec<String> {
        self.path
            .captures_iter(text)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}

impl SourceInspector for GoSourceInspector {
    fn inspect(&self, dir: &Path) -> Result<Option<SourcePackage>, InspectError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(InspectError::ReadDir {
                    path: dir.to_path_buf(),
                    error: e.to_string(),
                })
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| is_go_file(p))
            .collect();
        files.sort();

        let mut package: Option<SourcePackage> = None;
        for file in files {
            let source = std::fs::read_to_string(&file).map_err(|e| InspectError::ReadFile {
                path: file.clone(),
                error: e.to_string(),
            })?;
            let Some((name, imports)) = self.parse_source(&source) else {
                continue;
            };
            let pkg = package.get_or_insert_with(|| SourcePackage {
                name: name.trim_end_matches("_test").to_string(),
                imports: SortedSet::new(),
            });
            pkg.imports.extend(imports);
        }
        Ok(package)
    }

    fn is_standard_library(&self, import: &str) -> bool {
        let first = import.split('/').next().unwrap_or_default();
        import == "C" || !first.contains('.')
    }
}

pub(crate) fn is_go_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file()
        && name.ends_with(".go")
        && !name.starts_with('.')
        && !name.starts_with('_')
}
