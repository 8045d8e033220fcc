//! High-level operations.
//!
//! This module contains the implementation of the llvm-prep commands.

pub mod archives;
pub mod checkout;
pub mod fingerprint;
pub mod prep_build;
pub mod resolve;
pub mod symlink;

pub use archives::{archive_list, write_archive_manifest};
pub use checkout::{check_out_all, CheckoutReport};
pub use fingerprint::{source_status, source_status_digest};
pub use prep_build::{prep_build, BuildOutcome, PrepResult, PrepServices};
pub use resolve::resolve_repositories;
pub use symlink::{install_build_symlink, install_source_symlinks, LinkOutcome};
