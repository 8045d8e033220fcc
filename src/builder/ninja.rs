//! Locating or bootstrapping `ninja`.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::repository::RepoName;
use crate::util::context::PrepContext;
use crate::util::errors::PrepError;
use crate::util::process::{find_executable_in_paths, is_executable, CommandRunner, ProcessBuilder};

pub const NINJA: &str = "ninja";

/// The self-hosted `ninja` inside its checkout.
pub fn self_hosted_ninja(ctx: &PrepContext) -> PathBuf {
    ctx.layout.local_root(RepoName::Ninja).join(NINJA)
}

/// Command that builds the self-hosted copy.
pub fn bootstrap_command(ctx: &PrepContext) -> ProcessBuilder {
    ProcessBuilder::new(&ctx.python)
        .args(["configure.py", "--bootstrap"])
        .cwd(ctx.layout.local_root(RepoName::Ninja))
}

/// Return a usable `ninja`, building the self-hosted copy if needed.
///
/// `PATH` is searched first, then the self-hosted copy. Only if neither
/// exists is the bootstrap run; a failed bootstrap is reported as a missing
/// tool.
pub fn build_ninja_if_needed(ctx: &PrepContext, runner: &dyn CommandRunner) -> Result<PathBuf> {
    if let Some(found) = find_executable_in_paths(NINJA, &ctx.search_path) {
        tracing::debug!("found ninja on PATH at {}", found.display());
        return Ok(found);
    }

    let hosted = self_hosted_ninja(ctx);
    if is_executable(&hosted) {
        tracing::debug!("using existing {}", hosted.display());
        return Ok(hosted);
    }

    tracing::info!("Bootstrapping ninja in {}", ctx.layout.local_root(RepoName::Ninja).display());
    if let Err(e) = runner.run("ninja bootstrap", &bootstrap_command(ctx)) {
        let mut searched = ctx.search_path.clone();
        searched.push(hosted);
        return Err(e.context(PrepError::tool_missing(NINJA, searched)));
    }
    Ok(hosted)
}
