//! Git working copies, driven through libgit2.

use std::path::Path;

use anyhow::{bail, Context, Result};
use git2::{DiffFormat, Repository, ResetType, Status, StatusOptions};

use crate::core::repository::RepositoryDescriptor;
use crate::sources::vcs::Vcs;
use crate::util::errors::PrepError;
use crate::util::fs::ensure_dir;

/// Git implementation of [`Vcs`].
#[derive(Debug, Default)]
pub struct GitVcs;

impl Vcs for GitVcs {
    fn check_out(&self, repo: &RepositoryDescriptor) -> Result<()> {
        let (Some(url), Some(reference)) = (repo.url(), repo.reference()) else {
            return Err(PrepError::configuration(format!(
                "repository `{}` has no url/ref to check out",
                repo.name()
            ))
            .into());
        };
        let root = repo.local_root();

        tracing::info!("Cloning {} ({}) into {}", url, reference, root.display());

        if let Some(parent) = root.parent() {
            ensure_dir(parent)?;
        }

        let git = Repository::clone(url, root)
            .with_context(|| format!("failed to clone {}", url))?;

        let commit = resolve_reference(&git, reference)?
            .peel_to_commit()
            .with_context(|| format!("`{}` does not name a commit in {}", reference, url))?;

        git.set_head_detached(commit.id())?;
        git.reset(commit.as_object(), ResetType::Hard, None)
            .with_context(|| format!("failed to check out `{}` in {}", reference, root.display()))?;

        Ok(())
    }

    fn status(&self, root: &Path) -> Result<String> {
        let repo = Repository::open(root)
            .with_context(|| format!("failed to open git repository: {}", root.display()))?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false);

        let statuses = repo.statuses(Some(&mut opts))?;
        let mut text = String::new();
        for entry in statuses.iter() {
            let (index, worktree) = status_codes(entry.status());
            text.push(index);
            text.push(worktree);
            text.push(' ');
            text.push_str(&String::from_utf8_lossy(entry.path_bytes()));
            text.push('\n');
        }
        Ok(text)
    }

    fn diff(&self, root: &Path) -> Result<String> {
        let repo = Repository::open(root)
            .with_context(|| format!("failed to open git repository: {}", root.display()))?;

        let head_tree = repo.head().ok().and_then(|h| h.peel_to_tree().ok());
        let diff = repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), None)?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                text.push(line.origin());
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;
        Ok(text)
    }
}

/// Look a reference up as a remote branch first, then as any revspec.
fn resolve_reference<'r>(repo: &'r Repository, reference: &str) -> Result<git2::Object<'r>> {
    for spec in [format!("origin/{}", reference), reference.to_string()] {
        if let Ok(object) = repo.revparse_single(&spec) {
            return Ok(object);
        }
    }
    bail!("reference `{}` not found", reference)
}

/// Two-column status code in the style of `git status --porcelain`.
fn status_codes(status: Status) -> (char, char) {
    if status.is_conflicted() {
        return ('U', 'U');
    }
    if status.is_wt_new() {
        return ('?', '?');
    }

    let index = if status.is_index_new() {
        'A'
    } else if status.is_index_modified() {
        'M'
    } else if status.is_index_deleted() {
        'D'
    } else if status.is_index_renamed() {
        'R'
    } else if status.is_index_typechange() {
        'T'
    } else {
        ' '
    };

    let worktree = if status.is_wt_modified() {
        'M'
    } else if status.is_wt_deleted() {
        'D'
    } else if status.is_wt_renamed() {
        'R'
    } else if status.is_wt_typechange() {
        'T'
    } else {
        ' '
    };

    (index, worktree)
}
