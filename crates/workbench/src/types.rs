//! Core types for the workbench components.

use crate::version::SemanticVersion;
use execkit::Cmd;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How the package manager ships a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Command-line formula
    Formula,
    /// Application bundle
    Cask,
}

/// A package the workbench installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Package {
    /// Name known to the package manager
    pub name: &'static str,
    /// Formula or cask
    pub kind: PackageKind,
}

impl Package {
    /// A command-line formula.
    pub const fn formula(name: &'static str) -> Self {
        Self {
            name,
            kind: PackageKind::Formula,
        }
    }

    /// An application cask.
    pub const fn cask(name: &'static str) -> Self {
        Self {
            name,
            kind: PackageKind::Cask,
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PackageKind::Formula => f.write_str(self.name),
            PackageKind::Cask => write!(f, "{} (cask)", self.name),
        }
    }
}

/// One of the four tools making up the workbench.
///
/// [`Component::ALL`] is the install order: the local cluster tool comes last
/// because installing it re-links the cluster CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    /// Container runtime (`docker`)
    ContainerRuntime,
    /// Hypervisor backing the local cluster VM (`virtualbox`)
    Hypervisor,
    /// Cluster CLI (`kubectl`)
    ClusterCli,
    /// Local single-node cluster (`minikube`)
    LocalCluster,
}

impl Component {
    /// All components, in install order.
    pub const ALL: [Self; 4] = [
        Self::ContainerRuntime,
        Self::Hypervisor,
        Self::ClusterCli,
        Self::LocalCluster,
    ];

    /// Short name, as accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContainerRuntime => "docker",
            Self::Hypervisor => "virtualbox",
            Self::ClusterCli => "kubectl",
            Self::LocalCluster => "minikube",
        }
    }

    /// What the component is for
    pub fn description(&self) -> &'static str {
        match self {
            Self::ContainerRuntime => "container runtime",
            Self::Hypervisor => "hypervisor",
            Self::ClusterCli => "cluster CLI",
            Self::LocalCluster => "local cluster",
        }
    }

    /// Package providing the component
    pub fn package(&self) -> Package {
        match self {
            Self::ContainerRuntime => Package::cask("docker"),
            Self::Hypervisor => Package::cask("virtualbox"),
            Self::ClusterCli => Package::formula("kubernetes-cli"),
            Self::LocalCluster => Package::formula("minikube"),
        }
    }

    /// Read-only command that succeeds only when the tool is usable.
    pub fn probe(&self) -> Cmd {
        match self {
            Self::ContainerRuntime => Cmd::new("docker").arg("--version"),
            Self::Hypervisor => Cmd::new("VBoxManage").arg("--version"),
            Self::ClusterCli => Cmd::new("kubectl").args(["version", "--client"]),
            Self::LocalCluster => Cmd::new("minikube").arg("version"),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docker" | "container-runtime" => Ok(Self::ContainerRuntime),
            "virtualbox" | "hypervisor" => Ok(Self::Hypervisor),
            "kubectl" | "kubernetes-cli" | "cluster-cli" => Ok(Self::ClusterCli),
            "minikube" | "local-cluster" => Ok(Self::LocalCluster),
            other => Err(format!(
                "unknown component '{other}' (expected docker, virtualbox, kubectl or minikube)"
            )),
        }
    }
}

/// Snapshot of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentStatus {
    /// Component described
    pub component: Component,
    /// Installed right now
    pub installed: bool,
    /// Installed when the session started
    pub previously_installed: bool,
    /// Version from the last probe, if it printed one
    pub version: Option<SemanticVersion>,
}
