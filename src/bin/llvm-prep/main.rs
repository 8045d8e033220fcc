//! llvm-prep CLI - prepares the LLVM/Swift toolchain for the debugger build

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("llvm_prep=debug")
    } else {
        EnvFilter::new("llvm_prep=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Build => commands::build::execute(&cli.global),
        Commands::Checkout => commands::checkout::execute(&cli.global),
        Commands::Repos => commands::repos::execute(&cli.global),
        Commands::Fingerprint(args) => commands::fingerprint::execute(&cli.global, args),
        Commands::Archives => commands::archives::execute(&cli.global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
