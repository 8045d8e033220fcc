//! Configuration file support.
//!
//! The configuration lives at `.llvm-prep/config.toml` inside the umbrella
//! source tree unless `--config` names another file. Every section is
//! optional; command-line flags and environment variables take precedence.
//!
//! ```toml
//! [paths]
//! checkout-root = ".."
//! build-root = "llvm-build"
//!
//! [build]
//! configuration = "debug-clang"
//! fingerprint-gate = true
//!
//! [status]
//! include-diffs = true
//!
//! [toolchain]
//! deployment-target = "10.13"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Location overrides
    pub paths: PathsConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Source status fingerprint settings
    pub status: StatusConfig,

    /// Compiler settings
    pub toolchain: ToolchainSettings,
}

/// Location overrides. Relative paths are resolved against the source root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PathsConfig {
    pub checkout_root: Option<PathBuf>,
    pub build_root: Option<PathBuf>,
    pub patches_dir: Option<PathBuf>,
    pub repos_dir: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Active configuration (debug, debug-clang, release, custom-swift)
    pub configuration: Option<String>,

    /// Interpreter used for the build script and the ninja bootstrap
    pub python: Option<PathBuf>,

    /// Repository-set identifier, instead of the umbrella branch name
    pub identifier: Option<String>,

    /// Skip generate+build when the source status digest is unchanged
    pub fingerprint_gate: bool,
}

/// Fingerprint-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StatusConfig {
    /// Hash diffs in addition to status output
    pub include_diffs: bool,
}

/// Compiler overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Path to the C compiler
    pub cc: Option<PathBuf>,

    /// Path to the C++ compiler
    pub cxx: Option<PathBuf>,

    /// Minimum macOS version, if not taken from the environment
    pub deployment_target: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration, falling back to defaults when the file is absent.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

/// Default config path for a source tree.
pub fn project_config_path(source_root: &Path) -> PathBuf {
    source_root.join(".llvm-prep").join("config.toml")
}
