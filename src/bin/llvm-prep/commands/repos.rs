//! `llvm-prep repos` command

use anyhow::Result;

use llvm_prep::ops::resolve_repositories;

use super::{load_context, repo_sets};
use crate::cli::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = load_context(global)?;
    let repos = resolve_repositories(&ctx.layout, &repo_sets(&ctx))?;

    for repo in &repos {
        println!("{}", repo);
    }
    Ok(())
}
