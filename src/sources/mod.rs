//! Where repositories come from and how their working copies are driven.

pub mod git;
pub mod repo_set;
pub mod svn;
pub mod vcs;

pub use repo_set::{RepoEntry, RepoSetDirectory, RepoSetSource};
pub use vcs::{SystemVcs, Vcs, VcsProvider};
