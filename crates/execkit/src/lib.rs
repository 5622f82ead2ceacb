//! # execkit
//!
//! External command execution for productionize.
//!
//! Every tool the workbench drives (package manager, container runtime,
//! cluster CLI, local cluster) is invoked through the [`CommandRunner`] trait.
//! Callers describe a command with [`Cmd`] and get back a [`CommandOutput`]
//! carrying the exit status and captured output.
//!
//! ## Example
//!
//! ```no_run
//! use execkit::{Cmd, CommandRunner, SystemRunner};
//!
//! let runner = SystemRunner::new();
//!
//! // Probes never fail, they collapse to `false`
//! if runner.probe(&Cmd::new("docker").arg("--version")) {
//!     let version = runner.run_capture(&Cmd::new("docker").arg("--version")).unwrap();
//!     println!("{version}");
//! }
//! ```
//!
//! ## Testing
//!
//! [`MockRunner`] records every invocation and answers with scripted
//! responses, so components built on top of the trait can be tested
//! without any of the real tools installed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cmd;
pub mod error;
pub mod mock;
pub mod system;

pub use cmd::{Cmd, CommandOutput};
pub use error::{Error, Result};
pub use mock::MockRunner;
pub use system::SystemRunner;

/// Runs external commands.
///
/// Only [`CommandRunner::run`] must be implemented. It returns `Err` when the
/// command could not be executed at all; a non-zero exit is reported through
/// [`CommandOutput::success`]. The provided methods layer the common
/// success/failure policies on top.
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion.
    fn run(&self, cmd: &Cmd) -> Result<CommandOutput>;

    /// Run a command and return just success/failure.
    fn run_status(&self, cmd: &Cmd) -> Result<bool> {
        Ok(self.run(cmd)?.success)
    }

    /// Run a command, turning a non-zero exit into [`Error::Failed`].
    fn run_checked(&self, cmd: &Cmd) -> Result<CommandOutput> {
        let output = self.run(cmd)?;
        if !output.success {
            return Err(Error::Failed {
                command: cmd.to_string(),
                code: output.code,
                stderr: output.stderr_str().trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Run a command and capture its trimmed stdout.
    fn run_capture(&self, cmd: &Cmd) -> Result<String> {
        Ok(self.run_checked(cmd)?.stdout_str().trim().to_string())
    }

    /// Run a read-only query. Any failure, including a missing binary,
    /// collapses to `false`.
    fn probe(&self, cmd: &Cmd) -> bool {
        match self.run(cmd) {
            Ok(output) => output.success,
            Err(e) => {
                log::debug!("probe `{cmd}` failed: {e}");
                false
            }
        }
    }

    /// Like [`CommandRunner::probe`], but returns stdout on success.
    fn probe_capture(&self, cmd: &Cmd) -> Option<String> {
        match self.run(cmd) {
            Ok(output) if output.success => Some(output.stdout_str()),
            Ok(_) => None,
            Err(e) => {
                log::debug!("probe `{cmd}` failed: {e}");
                None
            }
        }
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<R> {
    fn run(&self, cmd: &Cmd) -> Result<CommandOutput> {
        (**self).run(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_checked_maps_failure() {
        let runner = MockRunner::new();
        runner.on("kubectl get", CommandOutput::failure(1, "NotFound"));

        let err = runner
            .run_checked(&Cmd::new("kubectl").args(["get", "pod", "api"]))
            .unwrap_err();

        match err {
            Error::Failed {
                command,
                code,
                stderr,
            } => {
                assert_eq!(command, "kubectl get pod api");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "NotFound");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_capture_trims_stdout() {
        let runner = MockRunner::new();
        runner.on("minikube service", CommandOutput::success("http://192.168.99.100:30080\n"));

        let url = runner
            .run_capture(&Cmd::new("minikube").args(["service", "api", "--url"]))
            .unwrap();
        assert_eq!(url, "http://192.168.99.100:30080");
    }

    #[test]
    fn test_probe_never_errors() {
        let runner = MockRunner::failing();
        assert!(!runner.probe(&Cmd::new("docker").arg("--version")));
        assert!(runner.probe_capture(&Cmd::new("docker").arg("--version")).is_none());
    }

    #[test]
    fn test_arc_runner_delegates() {
        let mock = std::sync::Arc::new(MockRunner::new());
        let runner: std::sync::Arc<dyn CommandRunner> = mock.clone();

        assert!(runner.run_status(&Cmd::new("true")).unwrap());
        assert_eq!(mock.command_lines(), vec!["true"]);
    }
}
