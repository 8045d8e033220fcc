//! `llvm-prep build` command

use anyhow::Result;

use llvm_prep::builder::host_locator;
use llvm_prep::ops::{prep_build, BuildOutcome, PrepServices};
use llvm_prep::sources::SystemVcs;
use llvm_prep::util::process::SystemRunner;

use super::{load_context, repo_sets};
use crate::cli::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = load_context(global)?;

    let runner = SystemRunner;
    let vcs = SystemVcs::new(&runner);
    let sets = repo_sets(&ctx);
    let locator = host_locator(&ctx, &runner);
    let services = PrepServices {
        runner: &runner,
        vcs: &vcs,
        repo_sets: &sets,
        compilers: locator.as_ref(),
    };

    let result = prep_build(&ctx, &services)?;

    if !result.checkout.checked_out.is_empty() {
        eprintln!(
            "     Checked out {} repositor{} ({} patch(es) applied)",
            result.checkout.checked_out.len(),
            if result.checkout.checked_out.len() == 1 { "y" } else { "ies" },
            result.checkout.patched.len()
        );
    }
    match result.outcome {
        BuildOutcome::SkippedCustomToolchain => {
            eprintln!("     Skipped toolchain build (custom toolchain)");
        }
        BuildOutcome::UpToDate { .. } => {
            eprintln!("  Up to date {}", ctx.layout.expected_output_dir().display());
        }
        BuildOutcome::Built { .. } => {
            eprintln!("    Finished {}", ctx.layout.expected_output_dir().display());
        }
    }
    eprintln!(
        "   Published {} archive(s) to {}",
        result.archives.len(),
        ctx.layout.manifest_path().display()
    );

    Ok(())
}
