//! Test utilities and mocks for unit tests.
//!
//! [`MockExecutor`] stands in for real child processes and [`FakeVcs`]
//! for version-control clients, so the prep steps can be exercised against
//! temporary directories without network access or installed tools.

pub mod fixtures;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::core::repository::{RepoName, RepositoryDescriptor, VcsKind};
use crate::sources::vcs::{Vcs, VcsProvider};
use crate::util::errors::PrepError;
use crate::util::process::{CommandRunner, ProcessBuilder};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
        }
    }

    /// Create a failure output with the given status code.
    pub fn failure(status: i32) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

#[derive(Debug, Default)]
struct ExecutorState {
    expectations: Vec<(CommandPattern, MockProcessOutput)>,
    calls: Vec<ProcessBuilder>,
    default_output: Option<MockProcessOutput>,
}

/// Mock process executor.
///
/// Records every command it is asked to run and answers with the first
/// matching expectation.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<ExecutorState>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// A mock that answers every command with success and no output.
    pub fn permissive() -> Self {
        let exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success(""));
        exec
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::Exact(cmd.to_string()), output)
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::StartsWith(prefix.to_string()), output)
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.push(CommandPattern::Contains(substring.to_string()), output)
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&self, output: MockProcessOutput) -> &Self {
        self.lock().default_output = Some(output);
        self
    }

    fn push(&self, pattern: CommandPattern, output: MockProcessOutput) -> &Self {
        self.lock().expectations.push((pattern, output));
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ExecutorState> {
        self.state.lock().unwrap()
    }

    fn answer(&self, step: &str, cmd: &ProcessBuilder) -> Result<String> {
        let full_cmd = cmd.display_command();
        let mut state = self.lock();
        state.calls.push(cmd.clone());

        let output = state
            .expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(&full_cmd))
            .map(|(_, output)| output.clone())
            .or_else(|| state.default_output.clone());

        let Some(output) = output else {
            bail!("unexpected command: {}", full_cmd);
        };
        if output.status != 0 {
            return Err(PrepError::ExternalProcess {
                step: step.to_string(),
                command: full_cmd,
                code: Some(output.status),
            }
            .into());
        }
        Ok(output.stdout)
    }

    /// Display strings of all commands that were called.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.display_command()).collect()
    }

    /// Working directories of all commands, in call order.
    pub fn cwds(&self) -> Vec<Option<PathBuf>> {
        self.lock()
            .calls
            .iter()
            .map(|c| c.get_cwd().map(Path::to_path_buf))
            .collect()
    }
}

impl CommandRunner for MockExecutor {
    fn run(&self, step: &str, cmd: &ProcessBuilder) -> Result<()> {
        self.answer(step, cmd).map(|_| ())
    }

    fn capture(&self, step: &str, cmd: &ProcessBuilder) -> Result<String> {
        self.answer(step, cmd)
    }
}

/// Recording stand-in for every VCS kind.
///
/// `check_out` creates the local root; `status`/`diff` return canned text
/// keyed by working-copy root.
#[derive(Debug, Default)]
pub struct FakeVcs {
    checkouts: Mutex<Vec<(RepoName, VcsKind)>>,
    statuses: Mutex<HashMap<PathBuf, String>>,
    diffs: Mutex<HashMap<PathBuf, String>>,
    failing: Option<RepoName>,
}

impl FakeVcs {
    pub fn new() -> Self {
        FakeVcs::default()
    }

    /// Make `check_out` fail for one repository.
    pub fn failing_on(name: RepoName) -> Self {
        FakeVcs {
            failing: Some(name),
            ..FakeVcs::default()
        }
    }

    pub fn set_status(&self, root: &Path, text: &str) {
        self.statuses
            .lock()
            .unwrap()
            .insert(root.to_path_buf(), text.to_string());
    }

    pub fn set_diff(&self, root: &Path, text: &str) {
        self.diffs
            .lock()
            .unwrap()
            .insert(root.to_path_buf(), text.to_string());
    }

    /// Repositories checked out so far, in order.
    pub fn checkouts(&self) -> Vec<RepoName> {
        self.checkouts.lock().unwrap().iter().map(|(n, _)| *n).collect()
    }
}

impl Vcs for FakeVcs {
    fn check_out(&self, repo: &RepositoryDescriptor) -> Result<()> {
        if self.failing == Some(repo.name()) {
            bail!("simulated checkout failure for {}", repo.name());
        }
        self.checkouts
            .lock()
            .unwrap()
            .push((repo.name(), repo.vcs()));
        std::fs::create_dir_all(repo.local_root())?;
        Ok(())
    }

    fn status(&self, root: &Path) -> Result<String> {
        Ok(self.statuses.lock().unwrap().get(root).cloned().unwrap_or_default())
    }

    fn diff(&self, root: &Path) -> Result<String> {
        Ok(self.diffs.lock().unwrap().get(root).cloned().unwrap_or_default())
    }
}

impl VcsProvider for FakeVcs {
    fn vcs(&self, _kind: VcsKind) -> &dyn Vcs {
        self
    }
}
