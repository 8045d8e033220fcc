//! `llvm-prep archives` command

use anyhow::Result;

use llvm_prep::ops::write_archive_manifest;

use super::load_context;
use crate::cli::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = load_context(global)?;
    let archives = write_archive_manifest(&ctx.layout)?;

    for archive in &archives {
        println!("{}", archive.display());
    }
    Ok(())
}
