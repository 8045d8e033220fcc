//! Source status fingerprinting.
//!
//! The digest covers the concatenated VCS status text (and optionally the
//! diff text) of every repository, in descriptor order. It is a pure
//! function of the working copies on disk.

use anyhow::{Context, Result};

use crate::core::layout::Layout;
use crate::core::repository::RepositoryDescriptor;
use crate::sources::vcs::VcsProvider;
use crate::util::fs::write_string;
use crate::util::hash::Fingerprint;

/// Status text of one repository; a missing working copy contributes nothing.
pub fn repository_status(
    repo: &RepositoryDescriptor,
    vcs: &dyn VcsProvider,
    include_diffs: bool,
) -> Result<String> {
    let root = repo.local_root();
    if !root.exists() {
        tracing::debug!("{} not checked out, empty status", repo.name());
        return Ok(String::new());
    }

    let client = vcs.vcs(repo.effective_vcs());
    let mut text = client
        .status(root)
        .with_context(|| format!("failed to read status of `{}`", repo.name()))?;
    if include_diffs {
        text.push_str(
            &client
                .diff(root)
                .with_context(|| format!("failed to read diff of `{}`", repo.name()))?,
        );
    }
    Ok(text)
}

/// Concatenated status text of all repositories.
pub fn source_status(
    repos: &[RepositoryDescriptor],
    vcs: &dyn VcsProvider,
    include_diffs: bool,
) -> Result<String> {
    let mut all = String::new();
    for repo in repos {
        all.push_str(&repository_status(repo, vcs, include_diffs)?);
    }
    Ok(all)
}

/// Digest of [`source_status`].
pub fn source_status_digest(
    repos: &[RepositoryDescriptor],
    vcs: &dyn VcsProvider,
    include_diffs: bool,
) -> Result<String> {
    let mut fp = Fingerprint::new();
    for repo in repos {
        fp.update_str(&repository_status(repo, vcs, include_diffs)?);
    }
    Ok(fp.finish())
}

/// Digest stored by the last successful build, if any.
pub fn recorded_digest(layout: &Layout) -> Option<String> {
    std::fs::read_to_string(layout.status_record())
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Store `digest` next to the build output.
pub fn record_digest(layout: &Layout, digest: &str) -> Result<()> {
    write_string(&layout.status_record(), &format!("{}\n", digest))
}
