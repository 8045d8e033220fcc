//! Implementation of `llvm-prep build`.
//!
//! The run is strictly sequential: resolve, check out and patch, then (unless
//! a custom toolchain is in use) symlink, bootstrap `ninja`, generate, build
//! and link the output; the archive manifest is published last in every
//! configuration.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::{
    build_ninja_if_needed, resolve_compilers, run_build_script, run_cmake_if_needed,
    CompilerLocator,
};
use crate::core::repository::RepositoryDescriptor;
use crate::ops::archives::write_archive_manifest;
use crate::ops::checkout::{check_out_all, CheckoutReport};
use crate::ops::fingerprint::{record_digest, recorded_digest, source_status_digest};
use crate::ops::resolve::resolve_repositories;
use crate::ops::symlink::{install_build_symlink, install_source_symlinks};
use crate::sources::{RepoSetSource, VcsProvider};
use crate::util::context::PrepContext;
use crate::util::process::CommandRunner;

/// External collaborators of a prep run.
pub struct PrepServices<'a> {
    pub runner: &'a dyn CommandRunner,
    pub vcs: &'a dyn VcsProvider,
    pub repo_sets: &'a dyn RepoSetSource,
    pub compilers: &'a dyn CompilerLocator,
}

/// What happened to the toolchain build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// A custom toolchain is in use; nothing was built.
    SkippedCustomToolchain,
    /// The recorded digest matched the sources.
    UpToDate { digest: String },
    Built {
        digest: String,
        /// Whether CMake had to generate the build directory.
        generated: bool,
    },
}

/// Result of a full prep run.
#[derive(Debug, Clone)]
pub struct PrepResult {
    pub repositories: Vec<RepositoryDescriptor>,
    pub checkout: CheckoutReport,
    pub outcome: BuildOutcome,
    pub archives: Vec<PathBuf>,
}

/// Check out, build and publish.
pub fn prep_build(ctx: &PrepContext, services: &PrepServices<'_>) -> Result<PrepResult> {
    if ctx.configuration().uses_custom_toolchain() {
        tracing::info!("Using a custom toolchain, nothing to check out or build");
        let archives = write_archive_manifest(&ctx.layout)?;
        return Ok(PrepResult {
            repositories: Vec::new(),
            checkout: CheckoutReport::default(),
            outcome: BuildOutcome::SkippedCustomToolchain,
            archives,
        });
    }

    tracing::info!("Resolving repositories");
    let repositories = resolve_repositories(&ctx.layout, services.repo_sets)?;
    let checkout = check_out_all(ctx, &repositories, services.vcs, services.runner)?;

    let outcome = build_if_needed(ctx, &repositories, services)?;
    let archives = write_archive_manifest(&ctx.layout)?;

    Ok(PrepResult {
        repositories,
        checkout,
        outcome,
        archives,
    })
}

fn build_if_needed(
    ctx: &PrepContext,
    repos: &[RepositoryDescriptor],
    services: &PrepServices<'_>,
) -> Result<BuildOutcome> {
    let digest = source_status_digest(repos, services.vcs, ctx.include_diffs)?;
    tracing::debug!("source status digest {}", digest);

    if ctx.fingerprint_gate && recorded_digest(&ctx.layout).as_deref() == Some(digest.as_str()) {
        tracing::info!("Sources unchanged since the last build, skipping");
        return Ok(BuildOutcome::UpToDate { digest });
    }

    install_source_symlinks(&ctx.layout, repos)?;

    let ninja = build_ninja_if_needed(ctx, services.runner)?;
    let compilers = resolve_compilers(ctx, services.compilers)?;
    let generated = run_cmake_if_needed(ctx, &compilers, &ninja, services.runner)?;

    run_build_script(ctx, services.runner)?;
    install_build_symlink(&ctx.layout)?;
    record_digest(&ctx.layout, &digest)?;

    Ok(BuildOutcome::Built { digest, generated })
}
