//! Recording runner for tests.

use crate::CommandRunner;
use crate::cmd::{Cmd, CommandOutput};
use crate::error::Result;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock runner that never spawns a process.
///
/// Responses are matched by command-line prefix (`"kubectl get pod"`
/// matches `kubectl get pod api -n demo`). When several rules match, the one
/// registered last wins, so a test can change the answer halfway through.
/// Commands matching no rule get the fallback response.
///
/// Clones share state, which lets a test keep a handle for assertions
/// while the component under test owns another.
#[derive(Debug, Clone)]
pub struct MockRunner {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    rules: Vec<(String, CommandOutput)>,
    fallback: CommandOutput,
    calls: Vec<Cmd>,
}

impl MockRunner {
    /// Create a mock where unmatched commands succeed with empty output.
    pub fn new() -> Self {
        Self::with_fallback(CommandOutput::success(""))
    }

    /// Create a mock where unmatched commands exit with status 1.
    pub fn failing() -> Self {
        Self::with_fallback(CommandOutput::failure(1, "mock: command failed"))
    }

    fn with_fallback(fallback: CommandOutput) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                rules: Vec::new(),
                fallback,
                calls: Vec::new(),
            })),
        }
    }

    /// Answer commands starting with `prefix` with `output`.
    pub fn on(&self, prefix: impl Into<String>, output: CommandOutput) -> &Self {
        self.lock().rules.push((prefix.into(), output));
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<Cmd> {
        self.lock().calls.clone()
    }

    /// Every command line run so far, in order.
    pub fn command_lines(&self) -> Vec<String> {
        self.lock().calls.iter().map(ToString::to_string).collect()
    }

    /// Number of recorded commands starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.to_string().starts_with(prefix))
            .count()
    }

    /// Whether any recorded command starts with `prefix`.
    pub fn was_called(&self, prefix: &str) -> bool {
        self.count(prefix) > 0
    }

    /// Forget recorded calls, keeping the rules.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &Cmd) -> Result<CommandOutput> {
        let line = cmd.to_string();
        let mut state = self.lock();
        state.calls.push(cmd.clone());

        let output = state
            .rules
            .iter()
            .rev()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| state.fallback.clone());

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let mock = MockRunner::new();
        mock.run(&Cmd::new("docker").arg("--version")).unwrap();
        mock.run(&Cmd::new("kubectl").args(["version", "--client"]))
            .unwrap();

        assert_eq!(
            mock.command_lines(),
            vec!["docker --version", "kubectl version --client"]
        );
        assert_eq!(mock.count("docker"), 1);
        assert!(!mock.was_called("minikube"));
    }

    #[test]
    fn test_last_matching_rule_wins() {
        let mock = MockRunner::new();
        mock.on("docker inspect", CommandOutput::failure(1, "No such object"));
        let cmd = Cmd::new("docker").args(["inspect", "api"]);
        assert!(!mock.run(&cmd).unwrap().success);

        mock.on("docker inspect api", CommandOutput::success("[]"));
        assert!(mock.run(&cmd).unwrap().success);
    }

    #[test]
    fn test_failing_fallback() {
        let mock = MockRunner::failing();
        mock.on("brew", CommandOutput::success(""));

        assert!(mock.run(&Cmd::new("brew").arg("--version")).unwrap().success);
        assert!(!mock.run(&Cmd::new("docker").arg("--version")).unwrap().success);
    }

    #[test]
    fn test_clones_share_state() {
        let mock = MockRunner::new();
        let handle = mock.clone();
        mock.run(&Cmd::new("minikube").arg("status")).unwrap();
        assert_eq!(handle.count("minikube status"), 1);

        handle.clear_calls();
        assert!(mock.calls().is_empty());
    }
}
