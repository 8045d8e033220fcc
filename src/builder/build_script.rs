//! The external toolchain build script.

use anyhow::Result;

use crate::core::repository::RepoName;
use crate::util::context::PrepContext;
use crate::util::process::{CommandRunner, ProcessBuilder};

pub const SOURCE_ROOT_ENV: &str = "SWIFT_SOURCE_ROOT";
pub const BUILD_ROOT_ENV: &str = "SWIFT_BUILD_ROOT";

pub fn build_script_command(ctx: &PrepContext) -> ProcessBuilder {
    let layout = &ctx.layout;
    ProcessBuilder::new(&ctx.python)
        .arg(layout.build_script())
        .args(layout.configuration.script_flags(ctx.stdlib_includes_devices))
        .arg(format!(
            "swift_install_destdir={}",
            layout.install_prefix(RepoName::Swift).display()
        ))
        .env(SOURCE_ROOT_ENV, layout.source_root.to_string_lossy())
        .env(BUILD_ROOT_ENV, layout.build_root.to_string_lossy())
        .cwd(&layout.source_root)
}

/// Run the build script; always runs when called.
pub fn run_build_script(ctx: &PrepContext, runner: &dyn CommandRunner) -> Result<()> {
    tracing::info!("Building the toolchain ({})", ctx.configuration());
    runner.run("build script", &build_script_command(ctx))
}
