//! Checking out and patching working copies.
//!
//! A fresh checkout gets a progress marker ([`Layout::patch_marker`]) listing
//! the patch files applied so far and, once all of them succeeded, a final
//! [`PATCHES_COMPLETE`] line. A working copy without a marker was put there by
//! someone else and is never touched; a completed one is never touched again;
//! an incomplete one resumes at the first unrecorded patch, so a run
//! interrupted mid-patching is finished by the next run instead of silently
//! staying half-patched.
//!
//! [`Layout::patch_marker`]: crate::core::layout::Layout::patch_marker

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

use crate::core::layout::PATCHES_COMPLETE;
use crate::core::repository::{RepoName, RepositoryDescriptor};
use crate::sources::vcs::VcsProvider;
use crate::util::context::PrepContext;
use crate::util::errors::PrepError;
use crate::util::fs::{list_dir_sorted, write_string};
use crate::util::process::{CommandRunner, ProcessBuilder};

/// What a checkout pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutReport {
    /// Repositories that were freshly checked out.
    pub checked_out: Vec<RepoName>,
    /// Patch files applied, in application order.
    pub patched: Vec<PathBuf>,
}

/// Check out and patch every repository whose working copy is missing.
///
/// Runs sequentially in descriptor order; the first failure aborts the pass
/// and leaves whatever was already done on disk.
pub fn check_out_all(
    ctx: &PrepContext,
    repos: &[RepositoryDescriptor],
    vcs: &dyn VcsProvider,
    runner: &dyn CommandRunner,
) -> Result<CheckoutReport> {
    let mut report = CheckoutReport::default();

    if ctx.configuration().uses_custom_toolchain() {
        tracing::info!("Using a custom toolchain, skipping checkouts");
        return Ok(report);
    }

    for repo in repos {
        check_out_if_needed(ctx, repo, vcs, runner, &mut report)?;
    }
    Ok(report)
}

fn check_out_if_needed(
    ctx: &PrepContext,
    repo: &RepositoryDescriptor,
    vcs: &dyn VcsProvider,
    runner: &dyn CommandRunner,
    report: &mut CheckoutReport,
) -> Result<()> {
    let root = repo.local_root();
    let marker = ctx.layout.patch_marker(repo.name());

    if root.exists() {
        if !marker.is_file() {
            tracing::debug!("{} already present at {}", repo.name(), root.display());
            return Ok(());
        }
    } else {
        tracing::info!("Checking out {}", repo.name());
        vcs.vcs(repo.vcs())
            .check_out(repo)
            .with_context(|| format!("checkout of `{}` failed", repo.name()))?;
        write_string(&marker, "")?;
        report.checked_out.push(repo.name());
    }

    apply_patches(&ctx.layout.patches_dir, repo, &marker, runner, report)
}

fn apply_patches(
    patches_dir: &Path,
    repo: &RepositoryDescriptor,
    marker: &Path,
    runner: &dyn CommandRunner,
    report: &mut CheckoutReport,
) -> Result<()> {
    let applied: HashSet<String> = std::fs::read_to_string(marker)
        .map_err(|e| PrepError::io(format!("failed to read {}", marker.display()), e))?
        .lines()
        .map(str::to_string)
        .collect();
    if applied.contains(PATCHES_COMPLETE) {
        tracing::debug!("{} already patched", repo.name());
        return Ok(());
    }

    for patch in matching_patches(patches_dir, repo.name())? {
        let Some(file_name) = patch.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if applied.contains(file_name) {
            continue;
        }

        tracing::info!("Applying {} to {}", file_name, repo.name());
        let cmd = ProcessBuilder::new("patch")
            .args(["-p0", "-i"])
            .arg(&patch)
            .cwd(repo.local_root());
        runner.run("patch apply", &cmd)?;

        record_patch(marker, file_name)?;
        report.patched.push(patch);
    }
    record_patch(marker, PATCHES_COMPLETE)
}

/// Patch files for `name` (`<name>.*.diff`), sorted by file name.
pub fn matching_patches(patches_dir: &Path, name: RepoName) -> Result<Vec<PathBuf>> {
    if !patches_dir.is_dir() {
        return Ok(Vec::new());
    }
    let pattern = Pattern::new(&format!("{}.*.diff", Pattern::escape(name.as_str())))
        .context("invalid patch pattern")?;

    Ok(list_dir_sorted(patches_dir)?
        .into_iter()
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| pattern.matches(n))
        })
        .collect())
}

fn record_patch(marker: &Path, file_name: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(marker)
        .map_err(|e| PrepError::io(format!("failed to open {}", marker.display()), e))?;
    writeln!(file, "{}", file_name)
        .map_err(|e| PrepError::io(format!("failed to write {}", marker.display()), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::configuration::BuildConfiguration;
    use crate::core::repository::{Remote, VcsKind};
    use crate::test_support::{FakeVcs, MockExecutor, MockProcessOutput, TestTree};

    fn remote_descriptors(tree: &TestTree) -> Vec<RepositoryDescriptor> {
        RepoName::ALL
            .iter()
            .map(|n| {
                RepositoryDescriptor::remote(
                    *n,
                    VcsKind::Git,
                    tree.local_root(*n),
                    Remote {
                        url: format!("https://example.com/{}.git", n),
                        reference: "stable".to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_checks_out_each_missing_repo_once() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let vcs = FakeVcs::new();
        let exec = MockExecutor::permissive();

        let report = check_out_all(&tree.ctx, &remote_descriptors(&tree), &vcs, &exec).unwrap();

        assert_eq!(vcs.checkouts(), RepoName::ALL.to_vec());
        assert_eq!(report.checked_out, RepoName::ALL.to_vec());
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_applies_matching_patches_in_order() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let second = tree.write_patch("llvm.b-second.diff");
        let first = tree.write_patch("llvm.a-first.diff");
        tree.write_patch("clang.fix.diff");
        tree.write_patch("llvm.diff");
        tree.write_patch("llvm.notes.txt");

        let vcs = FakeVcs::new();
        let exec = MockExecutor::permissive();
        let repos = remote_descriptors(&tree);

        let report = check_out_all(&tree.ctx, &repos[..1], &vcs, &exec).unwrap();

        assert_eq!(report.patched, vec![first.clone(), second.clone()]);
        assert_eq!(
            exec.calls(),
            vec![
                format!("patch -p0 -i {}", first.display()),
                format!("patch -p0 -i {}", second.display()),
            ]
        );
        assert!(exec
            .cwds()
            .iter()
            .all(|c| c.as_deref() == Some(tree.local_root(RepoName::Llvm).as_path())));
    }

    #[test]
    fn test_rerun_is_a_no_op() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        tree.write_patch("swift.fix.diff");
        let vcs = FakeVcs::new();
        let exec = MockExecutor::permissive();
        let repos = remote_descriptors(&tree);

        check_out_all(&tree.ctx, &repos, &vcs, &exec).unwrap();
        let again = check_out_all(&tree.ctx, &repos, &vcs, &exec).unwrap();

        assert_eq!(again, CheckoutReport::default());
        assert_eq!(vcs.checkouts().len(), 5);
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn test_patch_added_after_completed_pass_is_not_applied() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        tree.write_patch("llvm.a.diff");
        let vcs = FakeVcs::new();
        let repos = remote_descriptors(&tree);
        check_out_all(&tree.ctx, &repos[..1], &vcs, &MockExecutor::permissive()).unwrap();

        tree.write_patch("llvm.b.diff");
        let exec = MockExecutor::new();
        let again = check_out_all(&tree.ctx, &repos[..1], &vcs, &exec).unwrap();

        assert_eq!(again, CheckoutReport::default());
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_marker_stays_out_of_the_working_copy() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let vcs = FakeVcs::new();
        let repos = remote_descriptors(&tree);

        check_out_all(&tree.ctx, &repos[..1], &vcs, &MockExecutor::permissive()).unwrap();

        let root = tree.local_root(RepoName::Llvm);
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
        assert_eq!(
            std::fs::read_to_string(tree.ctx.layout.patch_marker(RepoName::Llvm)).unwrap(),
            "complete\n"
        );
    }

    #[test]
    fn test_existing_unmarked_checkout_is_left_alone() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        tree.create_local_roots(&[RepoName::Cmark]);
        tree.write_patch("cmark.fix.diff");
        let vcs = FakeVcs::new();
        let exec = MockExecutor::permissive();
        let repos = remote_descriptors(&tree);

        check_out_all(&tree.ctx, &repos[3..4], &vcs, &exec).unwrap();

        assert!(vcs.checkouts().is_empty());
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn test_interrupted_patching_resumes() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        tree.write_patch("ninja.1.diff");
        let second = tree.write_patch("ninja.2.diff");
        let repos = remote_descriptors(&tree);
        let ninja = &repos[4..5];
        let vcs = FakeVcs::new();

        let failing = MockExecutor::new();
        failing.expect_contains("ninja.1.diff", MockProcessOutput::success(""));
        failing.expect_contains("ninja.2.diff", MockProcessOutput::failure(1));
        let err = check_out_all(&tree.ctx, ninja, &vcs, &failing).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::ExternalProcess { .. })
        ));

        let exec = MockExecutor::permissive();
        let report = check_out_all(&tree.ctx, ninja, &vcs, &exec).unwrap();

        assert_eq!(vcs.checkouts(), vec![RepoName::Ninja]);
        assert_eq!(report.patched, vec![second]);
        let marker = std::fs::read_to_string(tree.ctx.layout.patch_marker(RepoName::Ninja)).unwrap();
        assert_eq!(marker, "ninja.1.diff\nninja.2.diff\ncomplete\n");
    }

    #[test]
    fn test_custom_toolchain_never_checks_out() {
        let tree = TestTree::new(BuildConfiguration::CustomSwift);
        let vcs = FakeVcs::new();
        let exec = MockExecutor::new();

        let report = check_out_all(&tree.ctx, &remote_descriptors(&tree), &vcs, &exec).unwrap();

        assert_eq!(report, CheckoutReport::default());
        assert!(vcs.checkouts().is_empty());
        assert!(!tree.local_root(RepoName::Llvm).exists());
    }

    #[test]
    fn test_checkout_failure_aborts_remaining() {
        let tree = TestTree::new(BuildConfiguration::Debug);
        let vcs = FakeVcs::failing_on(RepoName::Clang);
        let exec = MockExecutor::permissive();

        let err = check_out_all(&tree.ctx, &remote_descriptors(&tree), &vcs, &exec).unwrap_err();

        assert!(err.to_string().contains("checkout of `clang` failed"));
        assert_eq!(vcs.checkouts(), vec![RepoName::Llvm]);
    }
}
