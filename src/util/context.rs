//! Process-wide settings for one run.
//!
//! Everything that would otherwise be an ambient lookup (environment
//! variables, the active configuration, the config file) is captured once
//! into a [`PrepContext`] and passed down by reference.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::configuration::BuildConfiguration;
use crate::core::layout::Layout;
use crate::util::config::Config;
use crate::util::errors::PrepError;

/// Selects the extended standard-library build preset when set.
pub const DEVICES_ENV: &str = "LLDB_SWIFT_STDLIB_INCLUDES_DEVICES";

/// Minimum macOS version override.
pub const DEPLOYMENT_TARGET_ENV: &str = "MACOSX_DEPLOYMENT_TARGET";

/// Snapshot of the environment variables a run consumes.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub path: Option<OsString>,
    pub deployment_target: Option<String>,
    pub stdlib_includes_devices: bool,
    pub home: Option<PathBuf>,
    pub cc: Option<PathBuf>,
    pub cxx: Option<PathBuf>,
}

impl Environment {
    /// Read the current process environment.
    pub fn capture() -> Self {
        Environment {
            path: std::env::var_os("PATH"),
            deployment_target: std::env::var(DEPLOYMENT_TARGET_ENV)
                .ok()
                .filter(|t| !t.is_empty()),
            stdlib_includes_devices: std::env::var_os(DEVICES_ENV).is_some(),
            home: directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf()),
            cc: std::env::var_os("CC").map(PathBuf::from),
            cxx: std::env::var_os("CXX").map(PathBuf::from),
        }
    }

    /// Directories listed in `PATH`, in order.
    pub fn search_path(&self) -> Vec<PathBuf> {
        self.path
            .as_ref()
            .map(|p| std::env::split_paths(p).collect())
            .unwrap_or_default()
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub source_root: PathBuf,
    pub build_root: Option<PathBuf>,
    pub configuration: Option<BuildConfiguration>,
    pub identifier: Option<String>,
}

/// Settings for a run, constructed once at start-up.
#[derive(Debug, Clone)]
pub struct PrepContext {
    pub layout: Layout,
    pub deployment_target: Option<String>,
    pub include_diffs: bool,
    pub stdlib_includes_devices: bool,
    pub search_path: Vec<PathBuf>,
    pub home: Option<PathBuf>,
    pub python: PathBuf,
    pub identifier: Option<String>,
    pub fingerprint_gate: bool,
    /// Pinned C compiler (`CC` or `toolchain.cc`).
    pub cc: Option<PathBuf>,
    /// Pinned C++ compiler (`CXX` or `toolchain.cxx`).
    pub cxx: Option<PathBuf>,
}

impl PrepContext {
    /// Merge CLI options, the config file and the environment.
    pub fn new(opts: ContextOptions, config: &Config, env: &Environment) -> Result<Self> {
        let source_root = opts.source_root;

        let configuration = match opts.configuration {
            Some(c) => c,
            None => match config.build.configuration.as_deref() {
                Some(s) => s.parse().map_err(PrepError::configuration)?,
                None => BuildConfiguration::default(),
            },
        };

        let mut layout = Layout::with_defaults(source_root.clone(), configuration);
        let paths = &config.paths;
        if let Some(ref p) = paths.checkout_root {
            layout.checkout_root = resolve(&source_root, p);
        }
        if let Some(ref p) = paths.build_root {
            layout.build_root = resolve(&source_root, p);
        }
        if let Some(ref p) = opts.build_root {
            layout.build_root = p.clone();
        }
        if let Some(ref p) = paths.patches_dir {
            layout.patches_dir = resolve(&source_root, p);
        }
        if let Some(ref p) = paths.repos_dir {
            layout.repos_dir = resolve(&source_root, p);
        }
        layout.manifest = paths.manifest.as_ref().map(|p| resolve(&source_root, p));

        Ok(PrepContext {
            layout,
            deployment_target: env
                .deployment_target
                .clone()
                .or_else(|| config.toolchain.deployment_target.clone()),
            include_diffs: config.status.include_diffs,
            stdlib_includes_devices: env.stdlib_includes_devices,
            search_path: env.search_path(),
            home: env.home.clone(),
            python: config
                .build
                .python
                .clone()
                .unwrap_or_else(|| PathBuf::from("python3")),
            identifier: opts.identifier.or_else(|| config.build.identifier.clone()),
            fingerprint_gate: config.build.fingerprint_gate,
            cc: env.cc.clone().or_else(|| config.toolchain.cc.clone()),
            cxx: env.cxx.clone().or_else(|| config.toolchain.cxx.clone()),
        })
    }

    pub fn configuration(&self) -> BuildConfiguration {
        self.layout.configuration
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
