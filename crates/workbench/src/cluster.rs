//! Local cluster lifecycle: start, stop and status.

use crate::error::{Error, Result};
use execkit::{Cmd, CommandRunner};
use reconcile::cluster::MINIKUBE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resources given to the local cluster VM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Number of CPUs
    pub cpus: u32,
    /// Memory in MB
    pub memory_mb: u32,
    /// Hypervisor driver
    pub driver: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            cpus: 2,
            memory_mb: 4096,
            driver: "virtualbox".to_string(),
        }
    }
}

/// Last observed state of the local cluster. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStatus {
    /// Host and control plane are both up
    Running,
    /// No cluster VM is running
    Stopped,
    /// The VM is up but the control plane is not
    Crashed,
    /// The status query itself failed or printed nothing usable
    #[serde(rename = "not responding")]
    NotResponding,
}

impl ClusterStatus {
    /// Every status, for exhaustive checks.
    pub const ALL: [Self; 4] = [
        Self::Running,
        Self::Stopped,
        Self::Crashed,
        Self::NotResponding,
    ];

    /// Name shown to the user, identical to the JSON form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Crashed => "crashed",
            Self::NotResponding => "not responding",
        }
    }

    /// Interpret `minikube status` output.
    ///
    /// The tool prints `host: ...`, `kubelet: ...` and `apiserver: ...` lines
    /// and exits non-zero whenever something is not running, so the exit
    /// status alone says little.
    pub fn from_status_output(output: &str) -> Self {
        let field = |key: &str| {
            output.lines().find_map(|line| {
                let (k, v) = line.split_once(':')?;
                (k.trim().eq_ignore_ascii_case(key)).then(|| v.trim().to_lowercase())
            })
        };

        match (field("host").as_deref(), field("apiserver").as_deref()) {
            (Some("running"), Some("running")) => Self::Running,
            (Some("running"), _) => Self::Crashed,
            (Some("stopped" | "nonexistent"), _) => Self::Stopped,
            _ if output.to_lowercase().contains("not found") => Self::Stopped,
            _ => Self::NotResponding,
        }
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start the local cluster.
pub fn start(runner: &dyn CommandRunner, config: &ClusterConfig) -> Result<()> {
    let cmd = Cmd::new(MINIKUBE)
        .arg("start")
        .args(["--cpus".to_string(), config.cpus.to_string()])
        .args(["--memory".to_string(), config.memory_mb.to_string()])
        .arg(format!("--vm-driver={}", config.driver));
    runner.run_checked(&cmd).map_err(|e| Error::Cluster {
        action: "start",
        message: e.to_string(),
    })?;
    Ok(())
}

/// Stop the local cluster.
pub fn stop(runner: &dyn CommandRunner) -> Result<()> {
    runner
        .run_checked(&Cmd::new(MINIKUBE).arg("stop"))
        .map_err(|e| Error::Cluster {
            action: "stop",
            message: e.to_string(),
        })?;
    Ok(())
}

/// Query the cluster state. Never fails.
pub fn status(runner: &dyn CommandRunner) -> ClusterStatus {
    match runner.run(&Cmd::new(MINIKUBE).arg("status")) {
        Ok(output) => {
            let text = format!("{}\n{}", output.stdout_str(), output.stderr_str());
            ClusterStatus::from_status_output(&text)
        }
        Err(e) => {
            log::debug!("cluster status query failed: {e}");
            ClusterStatus::NotResponding
        }
    }
}
