//! Repository location
//!
//! Maps an import identifier to the repository that holds it: VCS kind,
//! repository root identifier and clone address. Resolution is static:
//! configured overrides first, then well-known hosting sites, then an
//! explicit `.git`/`.hg`/`.svn`/`.bzr` suffix in the path.

use regex::Regex;

use crate::config::project::RepoOverride;
use crate::error::LocateError;
use crate::infra::vcs::VcsKind;

/// Repository that holds an import identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRoot {
    /// VCS kind
    pub vcs: VcsKind,
    /// Canonical repository identifier (an import path prefix)
    pub root: String,
    /// Clone address
    pub remote: String,
}

/// Resolves import identifiers to repositories
pub trait RepoLocator {
    fn resolve(&self, import: &str) -> Result<RepoRoot, LocateError>;
}

struct HostRule {
    pattern: Regex,
    vcs: VcsKind,
    /// Remote template; `{root}` and `{repo}` are substituted
    remote: &'static str,
}

/// Locator backed by configured overrides and built-in host rules
pub struct HostLocator {
    overrides: Vec<(String, RepoRoot)>,
    hosts: Vec<HostRule>,
    suffix: Regex,
}

impl std::fmt::Debug for HostLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostLocator")
            .field("overrides", &self.overrides)
            .field("hosts", &self.hosts.len())
            .finish_non_exhaustive()
    }
}

const ELEM: &str = r"[A-Za-z0-9_.\-]+";

impl HostLocator {
    /// Build a locator with the given overrides
    pub fn new(overrides: &[RepoOverride]) -> Result<Self, LocateError> {
        let mut resolved = Vec::with_capacity(overrides.len());
        for o in overrides {
            let prefix = o.prefix.trim_end_matches('/').to_string();
            check_identifier(&prefix)?;
            let vcs = VcsKind::from_cmd(&o.vcs).ok_or_else(|| LocateError::UnknownVcs {
                prefix: prefix.clone(),
                kind: o.vcs.clone(),
            })?;
            resolved.push((
                prefix.clone(),
                RepoRoot {
                    vcs,
                    root: prefix,
                    remote: o.remote.clone(),
                },
            ));
        }
        // Longest prefix wins.
        resolved.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(Self {
            overrides: resolved,
            hosts: builtin_hosts(),
            suffix: suffix_pattern(),
        })
    }

    fn from_override(&self, import: &str) -> Option<RepoRoot> {
        self.overrides
            .iter()
            .find(|(prefix, _)| {
                import == prefix
                    || (import.starts_with(prefix.as_str())
                        && import.as_bytes().get(prefix.len()) == Some(&b'/'))
            })
            .map(|(_, repo)| repo.clone())
    }

    fn from_host(&self, import: &str) -> Option<RepoRoot> {
        self.hosts.iter().find_map(|rule| {
            let caps = rule.pattern.captures(import)?;
            let root = caps.name("root")?.as_str();
            let repo = caps.name("repo").map_or("", |m| m.as_str());
            Some(RepoRoot {
                vcs: rule.vcs,
                root: root.to_string(),
                remote: rule.remote.replace("{root}", root).replace("{repo}", repo),
            })
        })
    }

    fn from_suffix(&self, import: &str) -> Option<RepoRoot> {
        let caps = self.suffix.captures(import)?;
        let root = caps.name("root")?.as_str();
        let vcs = VcsKind::from_cmd(caps.name("vcs")?.as_str())?;
        Some(RepoRoot {
            vcs,
            root: root.to_string(),
            remote: format!("https://{root}"),
        })
    }
}

impl RepoLocator for HostLocator {
    fn resolve(&self, import: &str) -> Result<RepoRoot, LocateError> {
        check_identifier(import)?;
        self.from_override(import)
            .or_else(|| self.from_host(import))
            .or_else(|| self.from_suffix(import))
            .ok_or_else(|| LocateError::Unrecognized {
                import: import.to_string(),
            })
    }
}

/// Reject identifiers that cannot be a path under the cache
fn check_identifier(import: &str) -> Result<(), LocateError> {
    let bad = import.is_empty()
        || import.starts_with('/')
        || import.contains('\\')
        || import
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(LocateError::InvalidImport {
            import: import.to_string(),
        })
    } else {
        Ok(())
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in repository pattern is valid")
}

fn builtin_hosts() -> Vec<HostRule> {
    let two = |host: &str| format!(r"^(?P<root>{host}/{ELEM}/{ELEM})(/{ELEM})*$");
    vec![
        HostRule {
            pattern: compile(&two(r"github\.com")),
            vcs: VcsKind::Git,
            remote: "https://{root}",
        },
        HostRule {
            pattern: compile(&two(r"gitlab\.com")),
            vcs: VcsKind::Git,
            remote: "https://{root}.git",
        },
        HostRule {
            pattern: compile(&two(r"bitbucket\.org")),
            vcs: VcsKind::Git,
            remote: "https://{root}",
        },
        HostRule {
            pattern: compile(&format!(r"^(?P<root>git\.sr\.ht/~{ELEM}/{ELEM})(/{ELEM})*$")),
            vcs: VcsKind::Git,
            remote: "https://{root}",
        },
        HostRule {
            pattern: compile(&format!(r"^(?P<root>hg\.sr\.ht/~{ELEM}/{ELEM})(/{ELEM})*$")),
            vcs: VcsKind::Mercurial,
            remote: "https://{root}",
        },
        HostRule {
            pattern: compile(&format!(r"^(?P<root>golang\.org/x/(?P<repo>{ELEM}))(/{ELEM})*$")),
            vcs: VcsKind::Git,
            remote: "https://go.googlesource.com/{repo}",
        },
        HostRule {
            pattern: compile(&format!(r"^(?P<root>launchpad\.net/{ELEM})(/{ELEM})*$")),
            vcs: VcsKind::Bazaar,
            remote: "https://{root}",
        },
    ]
}

fn suffix_pattern() -> Regex {
    compile(
        r"^(?P<root>(?:[a-z0-9.\-]+\.)+[a-z0-9.\-]+(?::[0-9]+)?(?:/~?[A-Za-z0-9_.\-]+)+?\.(?P<vcs>bzr|git|hg|svn))(?:/~?[A-Za-z0-9_.\-]+)*$",
    )
}
