//! Filesystem fixtures: a throwaway umbrella tree with sibling checkouts.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::configuration::BuildConfiguration;
use crate::core::repository::RepoName;
use crate::sources::repo_set::{RepoEntry, OVERRIDE_FILE};
use crate::util::config::Config;
use crate::util::context::{ContextOptions, Environment, PrepContext};

/// A temporary tree laid out as `<tmp>/lldb` plus sibling checkouts.
pub struct TestTree {
    pub tmp: TempDir,
    pub ctx: PrepContext,
}

impl TestTree {
    pub fn new(configuration: BuildConfiguration) -> Self {
        Self::with_env(configuration, Environment::default())
    }

    pub fn with_env(configuration: BuildConfiguration, env: Environment) -> Self {
        let tmp = TempDir::new().unwrap();
        let source_root = tmp.path().join("lldb");
        std::fs::create_dir_all(source_root.join("scripts").join("repos")).unwrap();

        let opts = ContextOptions {
            source_root,
            configuration: Some(configuration),
            identifier: Some("main".to_string()),
            ..Default::default()
        };
        let mut ctx = PrepContext::new(opts, &Config::default(), &env).unwrap();
        ctx.layout.platform = "test-x86_64".to_string();
        TestTree { tmp, ctx }
    }

    pub fn source_root(&self) -> &Path {
        &self.ctx.layout.source_root
    }

    pub fn local_root(&self, name: RepoName) -> PathBuf {
        self.ctx.layout.local_root(name)
    }

    /// Create the working copy directories for `names`.
    pub fn create_local_roots(&self, names: &[RepoName]) {
        for name in names {
            std::fs::create_dir_all(self.local_root(*name)).unwrap();
        }
    }

    /// Write a patch file into the patches directory.
    pub fn write_patch(&self, file_name: &str) -> PathBuf {
        let path = self.ctx.layout.patches_dir.join(file_name);
        std::fs::write(&path, "--- a\n+++ b\n").unwrap();
        path
    }

    /// Write an `OVERRIDE` repository set.
    pub fn write_override(&self, entries: &[RepoEntry]) {
        let json = serde_json::json!({ "repos": entries });
        std::fs::write(
            self.ctx.layout.repos_dir.join(OVERRIDE_FILE),
            serde_json::to_string_pretty(&json).unwrap(),
        )
        .unwrap();
    }

    /// Write a `<file>.json` repository set for `identifiers`.
    pub fn write_repo_set(&self, file: &str, identifiers: &[&str], entries: &[RepoEntry]) {
        let json = serde_json::json!({ "identifiers": identifiers, "repos": entries });
        std::fs::write(
            self.ctx.layout.repos_dir.join(file),
            serde_json::to_string_pretty(&json).unwrap(),
        )
        .unwrap();
    }
}

/// A git entry for every required repository.
pub fn full_entries() -> Vec<RepoEntry> {
    RepoName::ALL
        .iter()
        .map(|n| RepoEntry {
            name: n.to_string(),
            vcs: "git".to_string(),
            url: format!("https://github.com/apple/swift-{}.git", n),
            reference: "stable".to_string(),
        })
        .collect()
}

/// Write an executable shell script.
#[cfg(unix)]
pub fn write_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
