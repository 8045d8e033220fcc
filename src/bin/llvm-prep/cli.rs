//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use llvm_prep::BuildConfiguration;

/// llvm-prep - check out, patch and build the LLVM/Swift toolchain
#[derive(Parser)]
#[command(name = "llvm-prep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Umbrella source tree (defaults to the current directory)
    #[arg(long, global = true, env = "LLVM_PREP_SOURCE_ROOT")]
    pub source_root: Option<PathBuf>,

    /// Root of all build output
    #[arg(long, global = true, env = "LLVM_PREP_BUILD_ROOT")]
    pub build_root: Option<PathBuf>,

    /// Build configuration: debug, debug-clang, release or custom-swift
    #[arg(short, long, global = true, env = "LLVM_PREP_CONFIGURATION")]
    pub configuration: Option<BuildConfiguration>,

    /// Config file (defaults to <source-root>/.llvm-prep/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Identifier used to look up the repository set
    #[arg(long, global = true)]
    pub identifier: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check out, build and publish the archive manifest
    Build,

    /// Check out and patch missing repositories only
    Checkout,

    /// Show the resolved repositories
    Repos,

    /// Print the source status digest
    Fingerprint(FingerprintArgs),

    /// Write the archive manifest from existing build output
    Archives,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct FingerprintArgs {
    /// Also print the status text the digest covers
    #[arg(long)]
    pub show_status: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
