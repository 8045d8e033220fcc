//! Filesystem layout of a prep run.
//!
//! Every location is a pure function of a handful of roots, so "has this
//! step happened" can always be answered by looking at the disk.

use std::path::{Path, PathBuf};

use crate::core::configuration::BuildConfiguration;
use crate::core::repository::RepoName;

/// Directory under the checkout root holding per-repository patch markers.
pub const MARKER_DIR: &str = ".llvm-prep";

/// Last line of a patch marker once every patch has been applied.
pub const PATCHES_COMPLETE: &str = "complete";

/// File holding the source status digest of the last successful build.
pub const STATUS_RECORD: &str = ".source-status";

/// Resolved locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Umbrella (debugger) source tree.
    pub source_root: PathBuf,
    /// Directory holding one checkout per managed repository.
    pub checkout_root: PathBuf,
    /// Root of all build output.
    pub build_root: PathBuf,
    /// Directory scanned for `<name>.*.diff` patch files.
    pub patches_dir: PathBuf,
    /// Directory holding the repository-set JSON files.
    pub repos_dir: PathBuf,
    /// Explicit manifest location, if not the default.
    pub manifest: Option<PathBuf>,
    /// `<os>-<arch>` component of build directory names.
    pub platform: String,
    pub configuration: BuildConfiguration,
}

impl Layout {
    /// Layout with every location derived from `source_root`.
    pub fn with_defaults(source_root: PathBuf, configuration: BuildConfiguration) -> Self {
        let checkout_root = source_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| source_root.clone());
        Layout {
            checkout_root,
            build_root: source_root.join("llvm-build"),
            patches_dir: source_root.join("scripts"),
            repos_dir: source_root.join("scripts").join("repos"),
            manifest: None,
            platform: host_platform(),
            configuration,
            source_root,
        }
    }

    /// Working copy location for `name`.
    pub fn local_root(&self, name: RepoName) -> PathBuf {
        self.checkout_root.join(name.as_str())
    }

    /// Where the generator and build actually write output.
    pub fn output_dir(&self) -> PathBuf {
        self.build_root
            .join(self.configuration.dir_name())
            .join(&self.platform)
    }

    /// Patch progress marker for a checkout made by this tool.
    ///
    /// Kept beside the working copies so it never shows up in their status.
    pub fn patch_marker(&self, name: RepoName) -> PathBuf {
        self.checkout_root
            .join(MARKER_DIR)
            .join(format!("{}.patches", name))
    }

    /// Conventional output location, symlinked to [`Layout::output_dir`].
    pub fn expected_output_dir(&self) -> PathBuf {
        self.build_root.join(format!(
            "{}-{}",
            self.configuration.dir_name(),
            self.platform
        ))
    }

    /// Install prefix for one built project.
    pub fn install_prefix(&self, project: RepoName) -> PathBuf {
        self.expected_output_dir()
            .join(format!("{}-{}", project, self.platform))
    }

    /// Directories scanned for static archives, in manifest order.
    pub fn library_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.install_prefix(RepoName::Llvm).join("lib"),
            self.install_prefix(RepoName::Swift).join("lib"),
            self.install_prefix(RepoName::Cmark).join("src"),
        ]
    }

    /// Archive manifest consumed by the downstream link.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| self.expected_output_dir().join("archives.txt"))
    }

    /// Symlink inside the umbrella tree that points at a managed checkout.
    pub fn source_link(&self, local_root: &Path) -> PathBuf {
        match local_root.file_name() {
            Some(base) => self.source_root.join(base),
            None => self.source_root.join(local_root),
        }
    }

    /// The external toolchain build script.
    pub fn build_script(&self) -> PathBuf {
        self.local_root(RepoName::Swift)
            .join("utils")
            .join("build-script")
    }

    /// Where the digest of the last successful build is stored.
    pub fn status_record(&self) -> PathBuf {
        self.output_dir().join(STATUS_RECORD)
    }
}

/// `<os>-<arch>` for the host, using `macosx` for macOS.
pub fn host_platform() -> String {
    let os = match std::env::consts::OS {
        "macos" => "macosx",
        other => other,
    };
    format!("{}-{}", os, std::env::consts::ARCH)
}
