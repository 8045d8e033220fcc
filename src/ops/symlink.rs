//! Forward-reference symlinks.
//!
//! A symlink already at the link path is replaced; real content there is
//! never overwritten.

use std::path::Path;

use anyhow::Result;

use crate::core::layout::Layout;
use crate::core::repository::RepositoryDescriptor;
use crate::util::errors::PrepError;
use crate::util::fs::{ensure_dir, is_symlink, path_occupied, remove_symlink, symlink};

/// What [`install_symlink`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    Replaced,
    /// A real file or directory occupies the link path.
    KeptExisting,
}

/// Make `link` a symlink to `target`.
pub fn install_symlink(target: &Path, link: &Path) -> Result<LinkOutcome> {
    tracing::info!("Symlinking {} to {}", target.display(), link.display());

    let replaced = is_symlink(link);
    if replaced {
        remove_symlink(link).map_err(|e| {
            PrepError::io(format!("failed to remove symlink {}", link.display()), e)
        })?;
    }

    if path_occupied(link) {
        tracing::debug!("{} holds real content, leaving it", link.display());
        return Ok(LinkOutcome::KeptExisting);
    }

    if let Some(parent) = link.parent() {
        ensure_dir(parent)?;
    }
    symlink(target, link).map_err(|e| {
        PrepError::io(
            format!("failed to symlink {} to {}", target.display(), link.display()),
            e,
        )
    })?;

    Ok(if replaced {
        LinkOutcome::Replaced
    } else {
        LinkOutcome::Created
    })
}

/// Link every managed checkout into the umbrella source tree.
pub fn install_source_symlinks(layout: &Layout, repos: &[RepositoryDescriptor]) -> Result<()> {
    for repo in repos {
        let link = layout.source_link(repo.local_root());
        install_symlink(repo.local_root(), &link)?;
    }
    Ok(())
}

/// Link the conventional output location to where the build actually wrote.
pub fn install_build_symlink(layout: &Layout) -> Result<LinkOutcome> {
    install_symlink(&layout.output_dir(), &layout.expected_output_dir())
}
