//! Version-control capability.
//!
//! Each managed repository is driven through the small [`Vcs`] interface;
//! the implementation is picked by the descriptor's [`VcsKind`].

use std::path::Path;

use anyhow::Result;

use crate::core::repository::{RepositoryDescriptor, VcsKind};
use crate::sources::git::GitVcs;
use crate::sources::svn::SvnVcs;
use crate::util::errors::PrepError;
use crate::util::process::CommandRunner;

/// Operations the prep steps need from a version-control client.
pub trait Vcs {
    /// Create `repo.local_root()` from the descriptor's remote and reference.
    fn check_out(&self, repo: &RepositoryDescriptor) -> Result<()>;

    /// Working-copy status text for the tree at `root`.
    fn status(&self, root: &Path) -> Result<String>;

    /// Uncommitted changes in the tree at `root`, as unified diff text.
    fn diff(&self, root: &Path) -> Result<String>;
}

/// Picks the [`Vcs`] implementation for a kind.
pub trait VcsProvider {
    fn vcs(&self, kind: VcsKind) -> &dyn Vcs;
}

/// A tree with no version control: nothing to fetch, nothing to report.
#[derive(Debug, Default)]
pub struct NoVcs;

impl Vcs for NoVcs {
    fn check_out(&self, repo: &RepositoryDescriptor) -> Result<()> {
        Err(PrepError::configuration(format!(
            "repository `{}` has no version control to check out from",
            repo.name()
        ))
        .into())
    }

    fn status(&self, _root: &Path) -> Result<String> {
        Ok(String::new())
    }

    fn diff(&self, _root: &Path) -> Result<String> {
        Ok(String::new())
    }
}

/// The real clients: `git2` for git, the `svn` executable for Subversion.
pub struct SystemVcs<'a> {
    git: GitVcs,
    svn: SvnVcs<'a>,
    none: NoVcs,
}

impl<'a> SystemVcs<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        SystemVcs {
            git: GitVcs,
            svn: SvnVcs::new(runner),
            none: NoVcs,
        }
    }
}

impl VcsProvider for SystemVcs<'_> {
    fn vcs(&self, kind: VcsKind) -> &dyn Vcs {
        match kind {
            VcsKind::Git => &self.git,
            VcsKind::Svn => &self.svn,
            VcsKind::Unversioned => &self.none,
        }
    }
}
