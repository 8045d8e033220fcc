//! llvm-prep - checks out, patches and builds the LLVM/Swift toolchain a
//! debugger build depends on.
//!
//! Every step decides for itself whether it still has work to do by looking
//! at the filesystem, so a run can be repeated after any failure.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// Only compiled for tests. Provides a recording command runner, a fake VCS
/// and temporary directory fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildConfiguration, Layout, RepoName, RepositoryDescriptor, VcsKind};
pub use util::context::PrepContext;
pub use util::errors::PrepError;
