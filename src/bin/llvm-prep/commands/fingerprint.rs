//! `llvm-prep fingerprint` command

use anyhow::Result;

use llvm_prep::ops::fingerprint::{recorded_digest, source_status, source_status_digest};
use llvm_prep::ops::resolve_repositories;
use llvm_prep::sources::SystemVcs;
use llvm_prep::util::process::SystemRunner;

use super::{load_context, repo_sets};
use crate::cli::{FingerprintArgs, GlobalArgs};

pub fn execute(global: &GlobalArgs, args: FingerprintArgs) -> Result<()> {
    let ctx = load_context(global)?;
    let runner = SystemRunner;
    let vcs = SystemVcs::new(&runner);
    let repos = resolve_repositories(&ctx.layout, &repo_sets(&ctx))?;

    if args.show_status {
        print!("{}", source_status(&repos, &vcs, ctx.include_diffs)?);
    }

    let digest = source_status_digest(&repos, &vcs, ctx.include_diffs)?;
    println!("{}", digest);

    match recorded_digest(&ctx.layout) {
        Some(ref recorded) if *recorded == digest => {
            tracing::info!("matches the last successful build");
        }
        Some(_) => tracing::info!("differs from the last successful build"),
        None => tracing::debug!("no build recorded yet"),
    }
    Ok(())
}
