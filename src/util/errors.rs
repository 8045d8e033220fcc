//! Error taxonomy for a prep run.
//!
//! Every variant is fatal: nothing retries, and whatever partial state was
//! on disk stays there for the next invocation's "already done" checks.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A fatal error raised by one of the prep steps.
#[derive(Debug, Error)]
pub enum PrepError {
    /// No usable repository set could be resolved.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A required tool was not found after exhausting every search location.
    #[error("could not find `{tool}` in any of these locations: {}", display_locations(.searched))]
    ToolMissing { tool: String, searched: Vec<PathBuf> },

    /// An external process exited unsuccessfully.
    #[error("{step} failed: `{command}` exited with {}", display_code(*.code))]
    ExternalProcess {
        step: String,
        command: String,
        code: Option<i32>,
    },

    /// A filesystem operation failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl PrepError {
    pub fn configuration(message: impl Into<String>) -> Self {
        PrepError::Configuration {
            message: message.into(),
        }
    }

    pub fn tool_missing(tool: impl Into<String>, searched: Vec<PathBuf>) -> Self {
        PrepError::ToolMissing {
            tool: tool.into(),
            searched,
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        PrepError::Io {
            context: context.into(),
            source,
        }
    }
}

fn display_locations(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "(none)".to_string();
    }
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}
