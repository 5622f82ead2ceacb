//! Runner that executes real processes.

use crate::cmd::{Cmd, CommandOutput};
use crate::error::{Error, Result};
use crate::CommandRunner;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often a child is polled while a timeout is in effect.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs commands as child processes of the current process.
///
/// Without a timeout every command blocks until it exits. With a timeout the
/// child is killed once the limit passes and [`Error::Timeout`] is returned.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Create a runner without a timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner that kills commands running longer than `limit`.
    pub fn with_timeout(limit: Duration) -> Self {
        Self {
            timeout: Some(limit),
        }
    }

    /// Configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &Cmd) -> Result<CommandOutput> {
        log::debug!("$ {cmd}");

        let mut command = Command::new(cmd.program());
        command
            .args(cmd.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in cmd.get_envs() {
            command.env(key, value);
        }
        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| Error::Spawn {
            command: cmd.to_string(),
            source,
        })?;

        // Drain pipes on their own threads so a chatty child can't block on
        // a full pipe while we wait for it.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match self.timeout {
            None => child.wait().map_err(|source| Error::Wait {
                command: cmd.to_string(),
                source,
            })?,
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    match child.try_wait() {
                        Ok(Some(status)) => break status,
                        Ok(None) if Instant::now() >= deadline => {
                            let _ = child.kill();
                            let _ = child.wait();
                            log::warn!("`{cmd}` killed after {}s", limit.as_secs());
                            return Err(Error::Timeout {
                                command: cmd.to_string(),
                                after: limit,
                            });
                        }
                        Ok(None) => thread::sleep(POLL_INTERVAL),
                        Err(source) => {
                            return Err(Error::Wait {
                                command: cmd.to_string(),
                                source,
                            });
                        }
                    }
                }
            }
        };

        let output = CommandOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
            success: status.success(),
            code: status.code(),
        };

        if !output.success {
            log::debug!(
                "`{cmd}` exited with {:?}: {}",
                output.code,
                output.stderr_str().trim()
            );
        }

        Ok(output)
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let runner = SystemRunner::new();
        let output = runner
            .run(&Cmd::new("sh").args(["-c", "echo hello"]))
            .unwrap();
        assert!(output.success);
        assert_eq!(output.stdout_str().trim(), "hello");
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let runner = SystemRunner::new();
        let output = runner
            .run(&Cmd::new("sh").args(["-c", "echo oops >&2; exit 3"]))
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stderr_str().trim(), "oops");
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let runner = SystemRunner::new();
        let err = runner
            .run(&Cmd::new("definitely-not-a-real-binary-3f9a"))
            .unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[test]
    fn test_env_and_current_dir() {
        let dir = std::env::temp_dir();
        let runner = SystemRunner::new();
        let output = runner
            .run(
                &Cmd::new("sh")
                    .args(["-c", "echo $PRODUCTIONIZE_TEST_VAR"])
                    .env("PRODUCTIONIZE_TEST_VAR", "set")
                    .current_dir(&dir),
            )
            .unwrap();
        assert_eq!(output.stdout_str().trim(), "set");
    }

    #[test]
    fn test_timeout_kills_child() {
        let runner = SystemRunner::with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        let err = runner.run(&Cmd::new("sleep").arg("5")).unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_timeout_not_hit() {
        let runner = SystemRunner::with_timeout(Duration::from_secs(5));
        assert!(runner.run_status(&Cmd::new("true")).unwrap());
    }
}
