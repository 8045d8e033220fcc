//! `llvm-prep checkout` command

use anyhow::Result;

use llvm_prep::ops::{check_out_all, resolve_repositories};
use llvm_prep::sources::SystemVcs;
use llvm_prep::util::process::SystemRunner;

use super::{load_context, repo_sets};
use crate::cli::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = load_context(global)?;

    if ctx.configuration().uses_custom_toolchain() {
        eprintln!("     Skipped checkout (custom toolchain)");
        return Ok(());
    }

    let runner = SystemRunner;
    let vcs = SystemVcs::new(&runner);
    let repos = resolve_repositories(&ctx.layout, &repo_sets(&ctx))?;
    let report = check_out_all(&ctx, &repos, &vcs, &runner)?;

    for name in &report.checked_out {
        eprintln!(" Checked out {}", name);
    }
    for patch in &report.patched {
        eprintln!("     Applied {}", patch.display());
    }
    if report.checked_out.is_empty() && report.patched.is_empty() {
        eprintln!("  Up to date all working copies present");
    }
    Ok(())
}
