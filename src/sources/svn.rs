//! Subversion working copies, driven through the `svn` client.

use std::path::Path;

use anyhow::Result;

use crate::core::repository::RepositoryDescriptor;
use crate::sources::vcs::Vcs;
use crate::util::errors::PrepError;
use crate::util::fs::ensure_dir;
use crate::util::process::{CommandRunner, ProcessBuilder};

/// Subversion implementation of [`Vcs`].
pub struct SvnVcs<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> SvnVcs<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        SvnVcs { runner }
    }
}

impl Vcs for SvnVcs<'_> {
    fn check_out(&self, repo: &RepositoryDescriptor) -> Result<()> {
        let Some(url) = repo.url() else {
            return Err(PrepError::configuration(format!(
                "repository `{}` has no url to check out",
                repo.name()
            ))
            .into());
        };
        let root = repo.local_root();
        if let Some(parent) = root.parent() {
            ensure_dir(parent)?;
        }

        tracing::info!("Checking out {} into {}", url, root.display());
        self.runner
            .run("svn checkout", &checkout_command(url, repo.reference(), root))
    }

    fn status(&self, root: &Path) -> Result<String> {
        self.runner
            .capture("svn status", &ProcessBuilder::new("svn").arg("status").cwd(root))
    }

    fn diff(&self, root: &Path) -> Result<String> {
        self.runner
            .capture("svn diff", &ProcessBuilder::new("svn").arg("diff").cwd(root))
    }
}

fn checkout_command(url: &str, reference: Option<&str>, root: &Path) -> ProcessBuilder {
    let mut cmd = ProcessBuilder::new("svn").arg("checkout");
    if let Some(rev) = reference.filter(|r| !r.is_empty()) {
        cmd = cmd.arg("-r").arg(rev);
    }
    cmd.arg(url).arg(root)
}
