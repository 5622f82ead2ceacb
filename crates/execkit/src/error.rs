//! Error types for command execution.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while running an external command.
#[derive(Debug, Error)]
pub enum Error {
    /// The program could not be started (missing binary, permissions).
    #[error("failed to execute `{command}`: {source}")]
    Spawn {
        /// Command line that was attempted
        command: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Waiting on the child process failed.
    #[error("failed to wait for `{command}`: {source}")]
    Wait {
        /// Command line being waited on
        command: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// The command ran longer than the configured limit and was killed.
    #[error("`{command}` timed out after {}s", .after.as_secs())]
    Timeout {
        /// Command line that timed out
        command: String,
        /// Configured limit
        after: Duration,
    },

    /// The command exited with a non-zero status.
    #[error("`{command}` failed{}: {stderr}", .code.map(|c| format!(" (exit {c})")).unwrap_or_default())]
    Failed {
        /// Command line that failed
        command: String,
        /// Exit code, if any
        code: Option<i32>,
        /// Trimmed standard error
        stderr: String,
    },
}

impl Error {
    /// Standard error text of a failed command, empty for other variants.
    pub fn stderr(&self) -> &str {
        match self {
            Self::Failed { stderr, .. } => stderr,
            _ => "",
        }
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, Error>;
