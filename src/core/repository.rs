//! Managed source repositories.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed set of source trees the toolchain build needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoName {
    Llvm,
    Clang,
    Swift,
    Cmark,
    Ninja,
}

impl RepoName {
    /// Every required repository, in build order.
    pub const ALL: [RepoName; 5] = [
        RepoName::Llvm,
        RepoName::Clang,
        RepoName::Swift,
        RepoName::Cmark,
        RepoName::Ninja,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RepoName::Llvm => "llvm",
            RepoName::Clang => "clang",
            RepoName::Swift => "swift",
            RepoName::Cmark => "cmark",
            RepoName::Ninja => "ninja",
        }
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepoName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepoName::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown repository `{}` (expected one of: llvm, clang, swift, cmark, ninja)",
                    s
                )
            })
    }
}

/// Version-control system a repository is managed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    Svn,
    Git,
    /// Pre-existing local checkout; nothing is ever fetched.
    #[serde(rename = "none")]
    Unversioned,
}

impl VcsKind {
    /// Detect the kind of an existing working copy from its metadata directory.
    pub fn detect(root: &Path) -> VcsKind {
        if root.join(".git").exists() {
            VcsKind::Git
        } else if root.join(".svn").exists() {
            VcsKind::Svn
        } else {
            VcsKind::Unversioned
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsKind::Svn => f.write_str("svn"),
            VcsKind::Git => f.write_str("git"),
            VcsKind::Unversioned => f.write_str("none"),
        }
    }
}

impl FromStr for VcsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svn" => Ok(VcsKind::Svn),
            "git" => Ok(VcsKind::Git),
            "none" => Ok(VcsKind::Unversioned),
            other => Err(format!("unknown vcs `{}` (expected svn or git)", other)),
        }
    }
}

/// Where a repository should be obtained from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub url: String,
    pub reference: String,
}

/// One managed source tree.
///
/// Built fresh by the resolver on every run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    name: RepoName,
    vcs: VcsKind,
    local_root: PathBuf,
    remote: Option<Remote>,
}

impl RepositoryDescriptor {
    /// A descriptor for a checkout that already exists on disk.
    pub fn local(name: RepoName, local_root: PathBuf) -> Self {
        RepositoryDescriptor {
            name,
            vcs: VcsKind::Unversioned,
            local_root,
            remote: None,
        }
    }

    /// A descriptor that can be checked out from `remote`.
    pub fn remote(name: RepoName, vcs: VcsKind, local_root: PathBuf, remote: Remote) -> Self {
        RepositoryDescriptor {
            name,
            vcs,
            local_root,
            remote: Some(remote),
        }
    }

    pub fn name(&self) -> RepoName {
        self.name
    }

    pub fn vcs(&self) -> VcsKind {
        self.vcs
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    pub fn url(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.url.as_str())
    }

    pub fn reference(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.reference.as_str())
    }

    /// The VCS to query for status: the declared kind, or whatever is on disk
    /// for a local checkout.
    pub fn effective_vcs(&self) -> VcsKind {
        match self.vcs {
            VcsKind::Unversioned => VcsKind::detect(&self.local_root),
            kind => kind,
        }
    }
}

impl fmt::Display for RepositoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.remote {
            Some(remote) => write!(
                f,
                "{} {} {}@{} -> {}",
                self.name,
                self.vcs,
                remote.url,
                remote.reference,
                self.local_root.display()
            ),
            None => write!(f, "{} (local) {}", self.name, self.local_root.display()),
        }
    }
}
