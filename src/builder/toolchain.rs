//! Host compiler discovery for the generator step.

use std::path::PathBuf;

use anyhow::Result;

use crate::util::context::PrepContext;
use crate::util::errors::PrepError;
use crate::util::process::{find_executable_in_paths, CommandRunner, ProcessBuilder};

/// C and C++ compilers handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilers {
    pub cc: PathBuf,
    pub cxx: PathBuf,
}

/// Platform-specific way of finding the host compilers.
pub trait CompilerLocator {
    fn c_compiler(&self) -> Result<PathBuf>;
    fn cxx_compiler(&self) -> Result<PathBuf>;
}

/// Asks `xcrun` for the compilers of the macOS SDK.
pub struct XcrunLocator<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> XcrunLocator<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        XcrunLocator { runner }
    }

    fn find(&self, tool: &str) -> Result<PathBuf> {
        let cmd = ProcessBuilder::new("xcrun").args(["--sdk", "macosx", "-find", tool]);
        let out = self.runner.capture("xcrun", &cmd)?;
        Ok(PathBuf::from(out.trim_end()))
    }
}

impl CompilerLocator for XcrunLocator<'_> {
    fn c_compiler(&self) -> Result<PathBuf> {
        self.find("clang")
    }

    fn cxx_compiler(&self) -> Result<PathBuf> {
        self.find("clang++")
    }
}

/// Searches `PATH` for clang.
#[derive(Debug, Clone)]
pub struct PathLocator {
    search_path: Vec<PathBuf>,
}

impl PathLocator {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        PathLocator { search_path }
    }

    fn find(&self, tool: &str) -> Result<PathBuf> {
        find_executable_in_paths(tool, &self.search_path)
            .ok_or_else(|| PrepError::tool_missing(tool, self.search_path.clone()).into())
    }
}

impl CompilerLocator for PathLocator {
    fn c_compiler(&self) -> Result<PathBuf> {
        self.find("clang")
    }

    fn cxx_compiler(&self) -> Result<PathBuf> {
        self.find("clang++")
    }
}

/// The locator for the host platform.
pub fn host_locator<'a>(ctx: &PrepContext, runner: &'a dyn CommandRunner) -> Box<dyn CompilerLocator + 'a> {
    if cfg!(target_os = "macos") {
        Box::new(XcrunLocator::new(runner))
    } else {
        Box::new(PathLocator::new(ctx.search_path.clone()))
    }
}

/// Pinned compilers from the context, the locator for anything not pinned.
pub fn resolve_compilers(ctx: &PrepContext, locator: &dyn CompilerLocator) -> Result<Compilers> {
    let cc = match ctx.cc {
        Some(ref cc) => cc.clone(),
        None => locator.c_compiler()?,
    };
    let cxx = match ctx.cxx {
        Some(ref cxx) => cxx.clone(),
        None => locator.cxx_compiler()?,
    };
    tracing::debug!("using cc={} cxx={}", cc.display(), cxx.display());
    Ok(Compilers { cc, cxx })
}
