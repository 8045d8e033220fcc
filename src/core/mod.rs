//! Core data structures.
//!
//! - Repository descriptors and the fixed set of managed repositories
//! - Build configurations
//! - The filesystem layout derived from the source and build roots

pub mod configuration;
pub mod layout;
pub mod repository;

pub use configuration::BuildConfiguration;
pub use layout::Layout;
pub use repository::{Remote, RepoName, RepositoryDescriptor, VcsKind};
