//! Command implementations

pub mod archives;
pub mod build;
pub mod checkout;
pub mod completions;
pub mod fingerprint;
pub mod repos;

use anyhow::Result;

use llvm_prep::sources::RepoSetDirectory;
use llvm_prep::util::config::{project_config_path, Config};
use llvm_prep::util::context::{ContextOptions, Environment, PrepContext};
use llvm_prep::PrepError;

use crate::cli::GlobalArgs;

/// Build the run context from the command line, config file and environment.
pub fn load_context(args: &GlobalArgs) -> Result<PrepContext> {
    let source_root = match args.source_root {
        Some(ref p) => p.clone(),
        None => std::env::current_dir()
            .map_err(|e| PrepError::io("failed to read the current directory", e))?,
    };
    let source_root = source_root.canonicalize().map_err(|e| {
        PrepError::io(
            format!("source root {} is not accessible", source_root.display()),
            e,
        )
    })?;

    let config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::load_or_default(&project_config_path(&source_root))?,
    };

    let opts = ContextOptions {
        source_root,
        build_root: args.build_root.clone(),
        configuration: args.configuration,
        identifier: args.identifier.clone(),
    };
    let ctx = PrepContext::new(opts, &config, &Environment::capture())?;
    tracing::debug!(
        "configuration {} building into {}",
        ctx.configuration(),
        ctx.layout.output_dir().display()
    );
    Ok(ctx)
}

/// Repository sets for the context's source tree.
pub fn repo_sets(ctx: &PrepContext) -> RepoSetDirectory {
    RepoSetDirectory::new(
        ctx.layout.repos_dir.clone(),
        ctx.layout.source_root.clone(),
        ctx.identifier.clone(),
    )
}
