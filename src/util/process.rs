//! Subprocess execution utilities.
//!
//! All external invocations are synchronous: the caller blocks until the
//! child exits, and a non-zero exit becomes [`PrepError::ExternalProcess`].

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::util::errors::PrepError;

/// Builder for subprocess execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: BTreeMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Overlay an environment variable on top of the ambient environment.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the environment overlay.
    pub fn get_env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Get the working directory.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Run with inherited stdio and require success.
    pub fn run(&self, step: &str) -> Result<()> {
        let status = self
            .build_command()
            .status()
            .with_context(|| format!("{}: failed to execute `{}`", step, self.display_command()))?;

        if !status.success() {
            return Err(PrepError::ExternalProcess {
                step: step.to_string(),
                command: self.display_command(),
                code: status.code(),
            }
            .into());
        }
        Ok(())
    }

    /// Run, capture stdout, and require success.
    pub fn capture(&self, step: &str) -> Result<String> {
        let output = self
            .build_command()
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("{}: failed to execute `{}`", step, self.display_command()))?;

        if !output.status.success() {
            return Err(PrepError::ExternalProcess {
                step: step.to_string(),
                command: self.display_command(),
                code: output.status.code(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Executes external commands on behalf of the prep steps.
pub trait CommandRunner {
    /// Run to completion with inherited stdio; non-zero exit is an error.
    fn run(&self, step: &str, cmd: &ProcessBuilder) -> Result<()>;

    /// Run to completion and return stdout; non-zero exit is an error.
    fn capture(&self, step: &str, cmd: &ProcessBuilder) -> Result<String>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, step: &str, cmd: &ProcessBuilder) -> Result<()> {
        tracing::debug!("running `{}`", cmd.display_command());
        cmd.run(step)
    }

    fn capture(&self, step: &str, cmd: &ProcessBuilder) -> Result<String> {
        tracing::debug!("capturing `{}`", cmd.display_command());
        cmd.capture(step)
    }
}

/// Find an executable in the given directories, in order.
pub fn find_executable_in_paths(name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let dirs: Vec<&PathBuf> = dirs.iter().filter(|d| !d.as_os_str().is_empty()).collect();
    if dirs.is_empty() {
        return None;
    }
    let joined = std::env::join_paths(dirs).ok()?;
    which::which_in(name, Some(joined), Path::new(".")).ok()
}

/// Check whether `path` is a regular file the current user may execute.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(windows)]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}
