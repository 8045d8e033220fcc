//! Repository-set lookup.
//!
//! A repository set names, for every managed repository, where to fetch it
//! from and at which reference. Sets live as JSON files in the repos
//! directory:
//!
//! - `OVERRIDE`: `{"repos": [...]}`, used unconditionally when present.
//! - `*.json`: `{"identifiers": ["<regex>", ...], "repos": [...]}`; the first
//!   file (in name order) with an identifier pattern matching the build
//!   identifier wins. Patterns are anchored at the start of the identifier.
//!
//! Each repo entry is `{"name", "vcs", "url", "ref"}`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use git2::Repository;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::util::errors::PrepError;
use crate::util::fs::{list_dir_sorted, read_to_string};

/// Name of the override file inside the repos directory.
pub const OVERRIDE_FILE: &str = "OVERRIDE";

/// One entry of a repository set, as written in the JSON files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub vcs: String,
    pub url: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

#[derive(Debug, Deserialize)]
struct OverrideFile {
    repos: Vec<RepoEntry>,
}

#[derive(Debug, Deserialize)]
struct RepoSetFile {
    identifiers: Vec<String>,
    repos: Vec<RepoEntry>,
}

/// Where repository sets come from.
pub trait RepoSetSource {
    /// The explicit override set, if one is configured.
    fn override_set(&self) -> Result<Option<Vec<RepoEntry>>>;

    /// Identifier used to look up a set when there is no override.
    fn identifier(&self) -> Result<String>;

    /// The set registered for `identifier`, if any.
    fn find(&self, identifier: &str) -> Result<Option<Vec<RepoEntry>>>;
}

/// Repository sets stored as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct RepoSetDirectory {
    dir: PathBuf,
    umbrella_root: PathBuf,
    identifier: Option<String>,
}

impl RepoSetDirectory {
    /// `umbrella_root` is the tree whose branch name is the default identifier.
    pub fn new(dir: PathBuf, umbrella_root: PathBuf, identifier: Option<String>) -> Self {
        RepoSetDirectory {
            dir,
            umbrella_root,
            identifier,
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
        let contents = read_to_string(path)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse repository set: {}", path.display()))
    }
}

impl RepoSetSource for RepoSetDirectory {
    fn override_set(&self) -> Result<Option<Vec<RepoEntry>>> {
        let path = self.dir.join(OVERRIDE_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        tracing::info!("Using repository override {}", path.display());
        let file: OverrideFile = Self::parse(&path)?;
        Ok(Some(file.repos))
    }

    fn identifier(&self) -> Result<String> {
        if let Some(ref id) = self.identifier {
            return Ok(id.clone());
        }
        branch_name(&self.umbrella_root).ok_or_else(|| {
            PrepError::configuration(format!(
                "cannot determine a repository-set identifier: {} is not on a git branch \
                 (set `build.identifier` or pass --identifier)",
                self.umbrella_root.display()
            ))
            .into()
        })
    }

    fn find(&self, identifier: &str) -> Result<Option<Vec<RepoEntry>>> {
        if !self.dir.is_dir() {
            return Ok(None);
        }
        for path in list_dir_sorted(&self.dir)? {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let set: RepoSetFile = Self::parse(&path)?;
            for pattern in &set.identifiers {
                let re = Regex::new(&format!("^(?:{})", pattern)).with_context(|| {
                    format!("invalid identifier pattern `{}` in {}", pattern, path.display())
                })?;
                if re.is_match(identifier) {
                    tracing::debug!("identifier `{}` matched {}", identifier, path.display());
                    return Ok(Some(set.repos));
                }
            }
        }
        Ok(None)
    }
}

/// Current branch of the git repository containing `root`.
fn branch_name(root: &Path) -> Option<String> {
    let repo = Repository::discover(root).ok()?;
    let head = repo.head().ok()?;
    if !head.is_branch() {
        return None;
    }
    head.shorthand().map(str::to_string)
}
