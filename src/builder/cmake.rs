//! CMake generate step for the LLVM tree.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::toolchain::Compilers;
use crate::core::repository::RepoName;
use crate::util::context::PrepContext;
use crate::util::errors::PrepError;
use crate::util::fs::ensure_dir;
use crate::util::process::{find_executable_in_paths, CommandRunner, ProcessBuilder};

/// Build file written by a successful generate.
pub const BUILD_NINJA: &str = "build.ninja";

/// Locations searched for `cmake` after `PATH`.
pub fn extra_cmake_dirs(home: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("/usr/local/bin"), PathBuf::from("/opt/local/bin")];
    if let Some(home) = home {
        dirs.push(home.join("bin"));
    }
    if cfg!(target_os = "macos") {
        if let Some(home) = home {
            dirs.push(home.join("Applications/CMake.app/Contents/bin"));
        }
        dirs.push(PathBuf::from("/Applications/CMake.app/Contents/bin"));
    }
    dirs
}

/// Find `cmake` on `PATH`, then in the usual install locations.
pub fn find_cmake(ctx: &PrepContext) -> Result<PathBuf> {
    find_cmake_in(ctx, extra_cmake_dirs(ctx.home.as_deref()))
}

/// Find `cmake` on `PATH`, then in `extra_dirs`.
pub fn find_cmake_in(ctx: &PrepContext, extra_dirs: Vec<PathBuf>) -> Result<PathBuf> {
    let mut searched = ctx.search_path.clone();
    searched.extend(extra_dirs);

    match find_executable_in_paths("cmake", &searched) {
        Some(cmake) => {
            tracing::debug!("found cmake at {}", cmake.display());
            Ok(cmake)
        }
        None => Err(PrepError::tool_missing("cmake", searched).into()),
    }
}

/// Whether the output directory still has to be generated.
pub fn needs_generate(output_dir: &Path) -> bool {
    !output_dir.is_dir() || !output_dir.join(BUILD_NINJA).is_file()
}

fn deployment_flags(target: Option<&str>) -> String {
    match target {
        Some(t) => format!("-mmacosx-version-min={}", t),
        None => String::new(),
    }
}

/// Generator invocation for the LLVM source tree.
pub struct CMakeGenerator<'a> {
    ctx: &'a PrepContext,
    cmake: PathBuf,
    compilers: Compilers,
    ninja: PathBuf,
    extra_args: Vec<String>,
}

impl<'a> CMakeGenerator<'a> {
    pub fn new(ctx: &'a PrepContext, cmake: PathBuf, compilers: Compilers, ninja: PathBuf) -> Self {
        CMakeGenerator {
            ctx,
            cmake,
            compilers,
            ninja,
            extra_args: Vec::new(),
        }
    }

    /// Append arguments after the standard flag set.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Every flag passed to `cmake`, ending with the source directory.
    pub fn flags(&self) -> Vec<String> {
        let layout = &self.ctx.layout;
        let target = self.ctx.deployment_target.as_deref();
        let flags = deployment_flags(target);

        let mut out = layout.configuration.generator_flags();
        out.push("-GNinja".to_string());
        out.push(format!("-DCMAKE_C_COMPILER={}", self.compilers.cc.display()));
        out.push(format!("-DCMAKE_CXX_COMPILER={}", self.compilers.cxx.display()));
        out.push(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            layout.install_prefix(RepoName::Llvm).display()
        ));
        out.push(format!("-DCMAKE_C_FLAGS={}", flags));
        out.push(format!("-DCMAKE_CXX_FLAGS={}", flags));
        out.push(format!("-DCMAKE_EXE_LINKER_FLAGS={}", flags));
        out.push(format!("-DCMAKE_SHARED_LINKER_FLAGS={}", flags));
        out.push("-DHAVE_CRASHREPORTER_INFO=1".to_string());
        if let Some(t) = target {
            out.push(format!("-DCMAKE_OSX_DEPLOYMENT_TARGET={}", t));
        }
        out.push(format!("-DCMAKE_MAKE_PROGRAM={}", self.ninja.display()));
        out.extend(self.extra_args.iter().cloned());
        out.push(layout.local_root(RepoName::Llvm).display().to_string());
        out
    }

    pub fn command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .args(self.flags())
            .cwd(self.ctx.layout.output_dir())
    }

    /// Create the output directory and run the generator in it.
    pub fn generate(&self, runner: &dyn CommandRunner) -> Result<()> {
        let output_dir = self.ctx.layout.output_dir();
        tracing::info!("Configuring LLVM in {}", output_dir.display());
        ensure_dir(&output_dir)?;
        runner.run("cmake generate", &self.command())
    }
}

/// Run the generator unless the output directory already has build files.
///
/// Returns whether the generator ran.
pub fn run_cmake_if_needed(
    ctx: &PrepContext,
    compilers: &Compilers,
    ninja: &Path,
    runner: &dyn CommandRunner,
) -> Result<bool> {
    let output_dir = ctx.layout.output_dir();
    if !needs_generate(&output_dir) {
        tracing::debug!("{} already generated", output_dir.display());
        return Ok(false);
    }

    let cmake = find_cmake(ctx)?;
    CMakeGenerator::new(ctx, cmake, compilers.clone(), ninja.to_path_buf()).generate(runner)?;
    Ok(true)
}
