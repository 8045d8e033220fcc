//! Named build configurations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The active build configuration. Exactly one is selected per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildConfiguration {
    /// Debugger in debug mode against a release+asserts toolchain.
    #[default]
    Debug,
    /// Debug toolchain with assertions.
    DebugClang,
    /// Release toolchain with assertions.
    Release,
    /// A pre-built toolchain is supplied externally; nothing is checked out or built.
    CustomSwift,
}

impl BuildConfiguration {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfiguration::Debug => "debug",
            BuildConfiguration::DebugClang => "debug-clang",
            BuildConfiguration::Release => "release",
            BuildConfiguration::CustomSwift => "custom-swift",
        }
    }

    /// Directory component used for this configuration's build output.
    pub fn dir_name(&self) -> &'static str {
        match self {
            BuildConfiguration::Debug => "Debug",
            BuildConfiguration::DebugClang => "DebugClang",
            BuildConfiguration::Release => "Release",
            BuildConfiguration::CustomSwift => "CustomSwift",
        }
    }

    /// Whether this configuration skips checkout and toolchain build entirely.
    pub fn uses_custom_toolchain(&self) -> bool {
        matches!(self, BuildConfiguration::CustomSwift)
    }

    /// Flags passed to the build-system generator.
    pub fn generator_flags(&self) -> Vec<String> {
        let build_type = match self {
            BuildConfiguration::Debug => "RelWithDebInfo",
            BuildConfiguration::DebugClang => "Debug",
            BuildConfiguration::Release => "Release",
            BuildConfiguration::CustomSwift => return Vec::new(),
        };
        vec![
            format!("-DCMAKE_BUILD_TYPE={}", build_type),
            "-DLLVM_ENABLE_ASSERTIONS=ON".to_string(),
        ]
    }

    /// Flags passed to the toolchain build script.
    ///
    /// `with_devices` selects the preset variant whose standard library also
    /// covers device platforms.
    pub fn script_flags(&self, with_devices: bool) -> Vec<String> {
        let preset = match self {
            BuildConfiguration::Debug | BuildConfiguration::Release => "LLDB_Swift_ReleaseAssert",
            BuildConfiguration::DebugClang => "LLDB_Swift_DebugAssert",
            BuildConfiguration::CustomSwift => return Vec::new(),
        };
        let suffix = if with_devices { "_with_devices" } else { "" };
        vec![format!("--preset={}{}", preset, suffix)]
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildConfiguration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildConfiguration::Debug),
            "debug-clang" | "debugclang" => Ok(BuildConfiguration::DebugClang),
            "release" => Ok(BuildConfiguration::Release),
            "custom-swift" | "customswift" => Ok(BuildConfiguration::CustomSwift),
            other => Err(format!(
                "unknown configuration `{}` (expected debug, debug-clang, release or custom-swift)",
                other
            )),
        }
    }
}
